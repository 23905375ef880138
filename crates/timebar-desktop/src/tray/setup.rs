use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::TrayIconBuilder;
use timebar_core::{MenuBarOptions, TrayIcon};

use super::{TRAY_ID, events, icons};

pub fn setup_tray(
    app: &tauri::App,
    options: &MenuBarOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let open = MenuItem::with_id(app, "open", "Open Timebar", true, None::<&str>)?;
    let hide = MenuItem::with_id(app, "hide", "Hide Timebar", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;
    let quit = MenuItem::with_id(app, "quit", "Quit Timebar", true, None::<&str>)?;
    let menu = Menu::with_items(app, &[&open, &hide, &sep, &quit])?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .icon(icons::load_icon(TrayIcon::Inactive)?)
        .tooltip(&options.tooltip)
        .show_menu_on_left_click(false)
        .on_menu_event(events::on_menu_event)
        .on_tray_icon_event(events::on_tray_icon_event);

    // Right click toggles the window instead of opening the menu
    if !options.show_on_right_click {
        builder = builder.menu(&menu);
    }

    builder.build(app)?;
    Ok(())
}
