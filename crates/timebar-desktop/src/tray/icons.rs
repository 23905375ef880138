//! Tray Icon Management
//!
//! Icons are embedded at compile time and decoded with the `image` crate.

use tauri::image::Image;
use timebar_core::TrayIcon;

pub const ICON_ACTIVE: &[u8] = include_bytes!("../../icons/icon-active.png");
pub const ICON_INACTIVE: &[u8] = include_bytes!("../../icons/icon-inactive.png");

pub fn icon_bytes(icon: TrayIcon) -> &'static [u8] {
    match icon {
        TrayIcon::Active => ICON_ACTIVE,
        TrayIcon::Inactive => ICON_INACTIVE,
    }
}

/// Decode a tray icon into RGBA
pub fn load_icon(icon: TrayIcon) -> Result<Image<'static>, image::ImageError> {
    let rgba = image::load_from_memory(icon_bytes(icon))?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new_owned(rgba.into_raw(), width, height))
}
