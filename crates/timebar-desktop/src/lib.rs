//! Timebar desktop application.
//!
//! The tray process owns the menu-bar controller and the status listener.
//! The same binary re-executes itself with `--poller` to run the poller role.

pub mod backend;
pub mod commands;
pub mod poller;
pub mod state;
pub mod status;
pub mod tray;

use anyhow::Context;
use tauri::{Manager, RunEvent};
use timebar_core::{Config, MenuBar};

use crate::backend::TauriBackend;
use crate::state::AppState;

pub fn run() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load settings")?;
    tracing::info!(api = %config.api_url, "starting tray");

    let app = tauri::Builder::default()
        .manage(AppState::new(config))
        .setup(|app| {
            let options = app.state::<AppState>().config.menubar.clone();

            #[cfg(target_os = "macos")]
            if !options.show_dock_icon {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
            }

            tray::setup_tray(app, &options)?;
            let menubar = MenuBar::new(TauriBackend::new(app.handle().clone()), options)?;
            app.state::<AppState>().install_menubar(menubar);

            status::spawn_listener(app.handle().clone());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_elapsed,
            commands::get_time_entries,
        ])
        .build(tauri::generate_context!())
        .context("failed to build tray application")?;

    app.run(|app, event| match event {
        // Closing the popup must not quit a tray app
        RunEvent::ExitRequested { code: None, api, .. } => api.prevent_exit(),
        RunEvent::Exit => app.state::<AppState>().stop_poller(),
        _ => {}
    });
    Ok(())
}
