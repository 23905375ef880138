//! Window placement relative to the tray icon.
//!
//! All coordinates are physical screen pixels with the origin at the top-left
//! of the primary display.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// A screen rectangle (tray icon bounds or a display's work area)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Some platforms report a zeroed rectangle instead of omitting bounds
    pub fn is_usable(&self) -> bool {
        self.x != 0
    }

    fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Anchor used when none is configured (the Windows taskbar sits at the bottom)
    pub fn default_anchor(self) -> Anchor {
        match self {
            Platform::Windows => Anchor::TrayBottomCenter,
            _ => Anchor::TrayCenter,
        }
    }

    /// Corner used for tray anchors when the tray bounds are unknown
    pub fn fallback_corner(self) -> Anchor {
        match self {
            Platform::Windows => Anchor::BottomRight,
            _ => Anchor::TopRight,
        }
    }
}

/// Named placement of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TrayLeft,
    TrayBottomLeft,
    TrayRight,
    TrayBottomRight,
    TrayCenter,
    TrayBottomCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
    Center,
}

impl Anchor {
    /// Whether placement depends on the tray icon bounds
    pub fn is_tray_relative(self) -> bool {
        matches!(
            self,
            Anchor::TrayLeft
                | Anchor::TrayBottomLeft
                | Anchor::TrayRight
                | Anchor::TrayBottomRight
                | Anchor::TrayCenter
                | Anchor::TrayBottomCenter
        )
    }
}

/// Compute the window origin for `anchor`.
///
/// `tray` may be `None` for screen-relative anchors. A tray-relative placement
/// that would push the window past the right edge of the work area is pulled
/// back to the top-right x coordinate.
pub fn calculate(anchor: Anchor, window: Size, work_area: Rect, tray: Option<Rect>) -> Point {
    let tray = tray.unwrap_or_default();
    let (w, h) = (window.width as i32, window.height as i32);

    let tray_center_x = tray.x + tray.width as i32 / 2 - w / 2;
    let top = work_area.y;
    let bottom = work_area.bottom() - h;
    let left = work_area.x;
    let right = work_area.right() - w;
    let center_x = work_area.x + work_area.width as i32 / 2 - w / 2;
    let center_y = work_area.y + work_area.height as i32 / 2 - h / 2;

    let point = |x, y| Point { x, y };
    let position = match anchor {
        Anchor::TrayLeft => point(tray.x, top),
        Anchor::TrayBottomLeft => point(tray.x, bottom),
        Anchor::TrayRight => point(tray.right() - w, top),
        Anchor::TrayBottomRight => point(tray.right() - w, bottom),
        Anchor::TrayCenter => point(tray_center_x, top),
        Anchor::TrayBottomCenter => point(tray_center_x, bottom),
        Anchor::TopLeft => point(left, top),
        Anchor::TopRight => point(right, top),
        Anchor::BottomLeft => point(left, bottom),
        Anchor::BottomRight => point(right, bottom),
        Anchor::TopCenter => point(center_x, top),
        Anchor::BottomCenter => point(center_x, bottom),
        Anchor::LeftCenter => point(left, center_y),
        Anchor::RightCenter => point(right, center_y),
        Anchor::Center => point(center_x, center_y),
    };

    if anchor.is_tray_relative() && position.x + w > work_area.right() {
        return point(right, position.y);
    }
    position
}
