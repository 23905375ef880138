//! Tray and window event handlers.
//!
//! Everything that touches the controller runs on the main thread. Window
//! events are deferred through the async runtime so they never re-enter a
//! controller call that is still holding the lock.

use tauri::menu::MenuEvent;
use tauri::tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconEvent};
use tauri::{AppHandle, Manager};
use timebar_core::menubar::Rect;
use timebar_core::{ClickEvent, ClickKind, MenuBar};

use crate::backend::TauriBackend;
use crate::state::AppState;

/// Tray icon bounds in physical pixels
fn tray_bounds(rect: tauri::Rect) -> Rect {
    let position = rect.position.to_physical::<i32>(1.0);
    let size = rect.size.to_physical::<u32>(1.0);
    Rect::new(position.x, position.y, size.width, size.height)
}

/// Translate a tray event into a controller click (press events are ignored)
fn click_event(event: TrayIconEvent) -> Option<ClickEvent> {
    match event {
        TrayIconEvent::Click {
            button,
            button_state: MouseButtonState::Up,
            rect,
            ..
        } => {
            let kind = match button {
                MouseButton::Left => ClickKind::Left,
                MouseButton::Right => ClickKind::Right,
                _ => return None,
            };
            // Tauri does not report keyboard modifiers for tray clicks
            Some(ClickEvent::new(kind, Some(tray_bounds(rect))))
        }
        TrayIconEvent::DoubleClick {
            button: MouseButton::Left,
            rect,
            ..
        } => Some(ClickEvent::new(ClickKind::Double, Some(tray_bounds(rect)))),
        _ => None,
    }
}

pub fn on_tray_icon_event(tray: &TrayIcon, event: TrayIconEvent) {
    let Some(click) = click_event(event) else {
        return;
    };
    tracing::debug!(?click, "tray clicked");
    tray.app_handle()
        .state::<AppState>()
        .with_menubar(|menubar| menubar.click(click));
}

/// Menu action for a tray menu item id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Open,
    Hide,
    Quit,
}

impl MenuAction {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "open" => Some(MenuAction::Open),
            "hide" => Some(MenuAction::Hide),
            "quit" => Some(MenuAction::Quit),
            _ => None,
        }
    }
}

pub fn on_menu_event(app: &AppHandle, event: MenuEvent) {
    let Some(action) = MenuAction::from_id(event.id.as_ref()) else {
        return;
    };
    let state = app.state::<AppState>();
    match action {
        MenuAction::Open => state.with_menubar(|menubar| menubar.show(None)),
        // Stands in for modifier-click, which tray events cannot report
        MenuAction::Hide => state.with_menubar(|menubar| menubar.hide()),
        MenuAction::Quit => app.exit(0),
    }
}

/// Run `f` on the main thread after the current event has been handled
fn defer<F>(app: &AppHandle, f: F)
where
    F: FnOnce(&mut MenuBar<TauriBackend>) -> Result<(), timebar_core::MenuBarError>
        + Send
        + 'static,
{
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let handle = app.clone();
        let result = app.run_on_main_thread(move || {
            handle.state::<AppState>().with_menubar(f);
        });
        if let Err(e) = result {
            tracing::warn!("failed to reach main thread: {e}");
        }
    });
}

pub fn on_focus_lost(app: &AppHandle) {
    defer(app, |menubar| menubar.focus_lost());
}

pub fn on_window_destroyed(app: &AppHandle) {
    defer(app, |menubar| {
        menubar.window_closed();
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_ids_map_to_actions() {
        assert_eq!(MenuAction::from_id("open"), Some(MenuAction::Open));
        assert_eq!(MenuAction::from_id("hide"), Some(MenuAction::Hide));
        assert_eq!(MenuAction::from_id("quit"), Some(MenuAction::Quit));
        assert_eq!(MenuAction::from_id("settings"), None);
    }
}
