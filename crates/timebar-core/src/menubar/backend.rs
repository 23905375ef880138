//! Capability surface the controller needs from the native toolkit.

use thiserror::Error;

use super::position::{Platform, Point, Rect, Size};

#[derive(Debug, Error)]
pub enum MenuBarError {
    #[error("window backend error: {0}")]
    Backend(String),
    #[error("no display available")]
    NoDisplay,
}

/// Which of the two tray images is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIcon {
    Active,
    Inactive,
}

/// Lifecycle notifications, in the order the controller emits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuBarEvent {
    Ready,
    CreateWindow,
    AfterCreateWindow,
    Show,
    AfterShow,
    Hide,
    AfterHide,
    AfterClose,
    FocusLost,
}

impl MenuBarEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            MenuBarEvent::Ready => "ready",
            MenuBarEvent::CreateWindow => "create-window",
            MenuBarEvent::AfterCreateWindow => "after-create-window",
            MenuBarEvent::Show => "show",
            MenuBarEvent::AfterShow => "after-show",
            MenuBarEvent::Hide => "hide",
            MenuBarEvent::AfterHide => "after-hide",
            MenuBarEvent::AfterClose => "after-close",
            MenuBarEvent::FocusLost => "focus-lost",
        }
    }
}

/// How the window is created. It always starts hidden and frameless.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub width: u32,
    pub height: u32,
    pub transparent: bool,
    pub always_on_top: bool,
    pub visible_on_all_workspaces: bool,
    pub index: String,
}

pub trait MenuBarWindow {
    fn is_visible(&self) -> bool;
    fn size(&self) -> Size;
    fn set_position(&mut self, position: Point) -> Result<(), MenuBarError>;
    fn show(&mut self) -> Result<(), MenuBarError>;
    fn hide(&mut self) -> Result<(), MenuBarError>;

    fn focus(&mut self) -> Result<(), MenuBarError> {
        Ok(())
    }
}

pub trait MenuBarBackend {
    type Window: MenuBarWindow;

    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<Self::Window, MenuBarError>;

    /// Usable area of the display containing `near` (primary display otherwise)
    fn work_area(&self, near: Option<Rect>) -> Result<Rect, MenuBarError>;

    fn set_icon(&mut self, icon: TrayIcon) -> Result<(), MenuBarError>;

    fn set_title(&mut self, title: &str) -> Result<(), MenuBarError>;

    fn set_tooltip(&mut self, tooltip: &str) -> Result<(), MenuBarError>;

    fn emit(&mut self, _event: MenuBarEvent) {}
}
