use serde::{Deserialize, Serialize};

use super::position::Anchor;

/// Tray window behavior, read from the `menubar` section of the settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuBarOptions {
    pub width: u32,
    pub height: u32,
    pub tooltip: String,
    /// Placement anchor (platform default when unset)
    pub window_position: Option<Anchor>,
    /// Toggle the window on right click instead of left click
    pub show_on_right_click: bool,
    /// Keep the window up when it loses focus and report the blur instead
    pub always_on_top: bool,
    /// Hide the window when it loses focus (ignored with `always_on_top`)
    pub hide_on_blur: bool,
    pub show_on_all_workspaces: bool,
    /// Create the window at startup instead of on first click
    pub preload_window: bool,
    /// macOS only
    pub show_dock_icon: bool,
    pub transparent: bool,
    /// Fixed coordinates, taking precedence over the anchor
    pub x: Option<i32>,
    pub y: Option<i32>,
    /// Page loaded into the window
    pub index: String,
}

impl Default for MenuBarOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 400,
            tooltip: "Timebar".to_string(),
            window_position: None,
            show_on_right_click: false,
            always_on_top: false,
            hide_on_blur: true,
            show_on_all_workspaces: true,
            preload_window: false,
            show_dock_icon: false,
            transparent: false,
            x: None,
            y: None,
            index: "index.html".to_string(),
        }
    }
}
