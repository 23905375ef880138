//! Tauri implementation of the menu-bar capability traits.

use tauri::{
    AppHandle, Emitter, PhysicalPosition, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, WindowEvent,
};
use timebar_core::menubar::{
    MenuBarBackend, MenuBarError, MenuBarEvent, MenuBarWindow, Point, Rect, Size, TrayIcon,
    WindowSpec,
};

use crate::tray::{self, TRAY_ID};

pub const WINDOW_LABEL: &str = "menubar";

fn backend_error(e: impl std::fmt::Display) -> MenuBarError {
    MenuBarError::Backend(e.to_string())
}

pub struct TauriWindow {
    window: WebviewWindow,
}

impl MenuBarWindow for TauriWindow {
    fn is_visible(&self) -> bool {
        self.window.is_visible().unwrap_or(false)
    }

    fn size(&self) -> Size {
        self.window
            .outer_size()
            .map(|size| Size {
                width: size.width,
                height: size.height,
            })
            .unwrap_or_default()
    }

    fn set_position(&mut self, position: Point) -> Result<(), MenuBarError> {
        self.window
            .set_position(PhysicalPosition::new(position.x, position.y))
            .map_err(backend_error)
    }

    fn show(&mut self) -> Result<(), MenuBarError> {
        self.window.show().map_err(backend_error)
    }

    fn hide(&mut self) -> Result<(), MenuBarError> {
        self.window.hide().map_err(backend_error)
    }

    fn focus(&mut self) -> Result<(), MenuBarError> {
        self.window.set_focus().map_err(backend_error)
    }
}

pub struct TauriBackend {
    app: AppHandle,
}

impl TauriBackend {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn tray(&self) -> Result<tauri::tray::TrayIcon, MenuBarError> {
        self.app
            .tray_by_id(TRAY_ID)
            .ok_or_else(|| MenuBarError::Backend(format!("tray icon {TRAY_ID} missing")))
    }
}

impl MenuBarBackend for TauriBackend {
    type Window = TauriWindow;

    fn create_window(&mut self, spec: &WindowSpec) -> Result<TauriWindow, MenuBarError> {
        let url = WebviewUrl::App(spec.index.clone().into());
        let window = WebviewWindowBuilder::new(&self.app, WINDOW_LABEL, url)
            .title("Timebar")
            .inner_size(f64::from(spec.width), f64::from(spec.height))
            // Off screen until the first show positions it
            .position(-10_000.0, -10_000.0)
            .visible(false)
            .decorations(false)
            .resizable(false)
            .skip_taskbar(true)
            .always_on_top(spec.always_on_top)
            .visible_on_all_workspaces(spec.visible_on_all_workspaces)
            .transparent(spec.transparent)
            .build()
            .map_err(backend_error)?;

        let app = self.app.clone();
        window.on_window_event(move |event| match event {
            WindowEvent::Focused(false) => tray::events::on_focus_lost(&app),
            WindowEvent::Destroyed => tray::events::on_window_destroyed(&app),
            _ => {}
        });

        Ok(TauriWindow { window })
    }

    fn work_area(&self, near: Option<Rect>) -> Result<Rect, MenuBarError> {
        let monitor = match near {
            Some(rect) => self
                .app
                .monitor_from_point(f64::from(rect.x), f64::from(rect.y))
                .map_err(backend_error)?,
            None => None,
        };
        let monitor = match monitor {
            Some(monitor) => monitor,
            None => self
                .app
                .primary_monitor()
                .map_err(backend_error)?
                .ok_or(MenuBarError::NoDisplay)?,
        };

        let area = monitor.work_area();
        Ok(Rect::new(
            area.position.x,
            area.position.y,
            area.size.width,
            area.size.height,
        ))
    }

    fn set_icon(&mut self, icon: TrayIcon) -> Result<(), MenuBarError> {
        let image = tray::icons::load_icon(icon).map_err(backend_error)?;
        self.tray()?.set_icon(Some(image)).map_err(backend_error)
    }

    fn set_title(&mut self, title: &str) -> Result<(), MenuBarError> {
        self.tray()?.set_title(Some(title)).map_err(backend_error)
    }

    fn set_tooltip(&mut self, tooltip: &str) -> Result<(), MenuBarError> {
        self.tray()?.set_tooltip(Some(tooltip)).map_err(backend_error)
    }

    fn emit(&mut self, event: MenuBarEvent) {
        tracing::trace!(event = event.as_str(), "menubar event");
        if let Err(e) = self.app.emit(event.as_str(), ()) {
            tracing::debug!("failed to emit {}: {e}", event.as_str());
        }
    }
}
