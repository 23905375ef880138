//! System Tray Module
//!
//! Manages the system tray icon, its menu and click handling.
//!
//! ## Architecture
//!
//! ```text
//! tray/
//! ├── icons.rs     - Icon constants & loading
//! ├── events.rs    - Event handlers (menu, icon clicks, window focus)
//! ├── setup.rs     - Tray initialization
//! └── mod.rs       - Public API (this file)
//! ```

pub mod events;
pub mod icons;
pub mod setup;

pub use setup::setup_tray;

pub const TRAY_ID: &str = "timebar-tray";
