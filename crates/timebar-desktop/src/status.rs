//! Status listener: applies poller messages to the tray and the popup.

use tauri::{AppHandle, Emitter, Manager};
use timebar_core::{ElapsedStatus, StatusEndpoint, StatusReceiver, TimeEntry};

use crate::commands::entry_views;
use crate::state::AppState;

/// Bind the status socket, start the poller child and apply updates until
/// the channel closes
pub fn spawn_listener(app: AppHandle) {
    tauri::async_runtime::spawn(async move {
        if let Err(e) = listen(app).await {
            tracing::error!("status listener stopped: {e:#}");
        }
    });
}

async fn listen(app: AppHandle) -> anyhow::Result<()> {
    let receiver = StatusReceiver::bind(StatusEndpoint::default_for_platform()).await?;
    let mut updates = receiver.updates();
    tokio::spawn(receiver.run());

    // The socket exists now, so the child's first connect succeeds
    app.state::<AppState>().restart_poller();

    loop {
        tokio::select! {
            changed = updates.elapsed.changed() => {
                changed?;
                let status = updates.elapsed.borrow_and_update().clone();
                apply_elapsed(&app, status);
            }
            changed = updates.entries.changed() => {
                changed?;
                let entries = updates.entries.borrow_and_update().clone();
                apply_entries(&app, entries);
            }
            changed = updates.credentials.changed() => {
                changed?;
                updates.credentials.borrow_and_update();
                tracing::info!("credentials updated, restarting poller");
                app.state::<AppState>().restart_poller();
            }
        }
    }
}

fn apply_elapsed(app: &AppHandle, status: ElapsedStatus) {
    let state = app.state::<AppState>();
    state.set_elapsed(status.clone());
    if let Err(e) = app.emit("elapsed-time", status.display()) {
        tracing::debug!("failed to emit elapsed time: {e}");
    }

    let handle = app.clone();
    let result = app.run_on_main_thread(move || {
        handle
            .state::<AppState>()
            .with_menubar(|menubar| menubar.apply_status(&status));
    });
    if let Err(e) = result {
        tracing::warn!("failed to reach main thread: {e}");
    }
}

fn apply_entries(app: &AppHandle, entries: Vec<TimeEntry>) {
    let views = entry_views(&entries);
    app.state::<AppState>().set_entries(entries);
    if let Err(e) = app.emit("time-entries", views) {
        tracing::debug!("failed to emit time entries: {e}");
    }
}
