//! Menu-bar controller.
//!
//! Owns the tray presentation (icon and title) and at most one popup window
//! anchored to the tray icon.
//!
//! ## Architecture
//!
//! ```text
//! menubar/
//! ├── backend.rs   - Capability traits implemented by the GUI toolkit
//! ├── options.rs   - User-facing options
//! ├── position.rs  - Anchor math
//! └── mod.rs       - MenuBar state machine (this file)
//! ```
//!
//! Window states: `NoWindow -> Visible` (create + show), `Hidden <-> Visible`
//! (click, focus loss), `any -> NoWindow` (window closed).

mod backend;
mod options;
mod position;

pub use backend::{
    MenuBarBackend, MenuBarError, MenuBarEvent, MenuBarWindow, TrayIcon, WindowSpec,
};
pub use options::MenuBarOptions;
pub use position::{Anchor, Platform, Point, Rect, Size, calculate};

use std::time::{Duration, Instant};

use crate::status::ElapsedStatus;

/// A tray click this soon after focus loss hid the window is the same
/// gesture: pressing the icon moved focus away from the window first.
pub const BLUR_CLICK_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    NoWindow,
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Left,
    Right,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.shift || self.ctrl || self.meta
    }
}

/// A click on the tray icon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub kind: ClickKind,
    /// Tray icon bounds, when the platform reports them
    pub bounds: Option<Rect>,
    pub modifiers: Modifiers,
}

impl ClickEvent {
    pub fn new(kind: ClickKind, bounds: Option<Rect>) -> Self {
        Self {
            kind,
            bounds,
            modifiers: Modifiers::default(),
        }
    }
}

/// What the tray currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayState {
    pub icon: TrayIcon,
    pub title: String,
}

pub struct MenuBar<B: MenuBarBackend> {
    backend: B,
    options: MenuBarOptions,
    platform: Platform,
    window: Option<B::Window>,
    /// Last usable tray bounds, reused when a click reports none
    cached_bounds: Option<Rect>,
    /// When focus loss last hid the window
    blur_hidden_at: Option<Instant>,
    tray: TrayState,
}

impl<B: MenuBarBackend> MenuBar<B> {
    /// Set up the tray and, with `preload_window`, create the window
    pub fn new(backend: B, options: MenuBarOptions) -> Result<Self, MenuBarError> {
        let platform = backend.platform();
        let mut menubar = Self {
            backend,
            options,
            platform,
            window: None,
            cached_bounds: None,
            blur_hidden_at: None,
            tray: TrayState {
                icon: TrayIcon::Inactive,
                title: String::new(),
            },
        };

        menubar.backend.set_tooltip(&menubar.options.tooltip)?;
        menubar.backend.set_icon(TrayIcon::Inactive)?;
        if menubar.options.preload_window {
            menubar.create_window()?;
        }
        menubar.backend.emit(MenuBarEvent::Ready);
        Ok(menubar)
    }

    pub fn state(&self) -> WindowState {
        match &self.window {
            None => WindowState::NoWindow,
            Some(window) if window.is_visible() => WindowState::Visible,
            Some(_) => WindowState::Hidden,
        }
    }

    pub fn tray(&self) -> &TrayState {
        &self.tray
    }

    pub fn options(&self) -> &MenuBarOptions {
        &self.options
    }

    pub fn window(&self) -> Option<&B::Window> {
        self.window.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn cached_bounds(&self) -> Option<Rect> {
        self.cached_bounds
    }

    fn accepts(&self, kind: ClickKind) -> bool {
        match kind {
            ClickKind::Double => true,
            ClickKind::Left => !self.options.show_on_right_click,
            ClickKind::Right => self.options.show_on_right_click,
        }
    }

    /// Handle a tray click.
    ///
    /// A held modifier always hides. Otherwise the window toggles.
    pub fn click(&mut self, event: ClickEvent) -> Result<(), MenuBarError> {
        self.click_at(event, Instant::now())
    }

    pub fn click_at(&mut self, event: ClickEvent, now: Instant) -> Result<(), MenuBarError> {
        if !self.accepts(event.kind) {
            return Ok(());
        }
        let blur_hidden_at = self.blur_hidden_at.take();
        if event.modifiers.any() || self.state() == WindowState::Visible {
            return self.hide();
        }
        if blur_hidden_at.is_some_and(|at| now.saturating_duration_since(at) < BLUR_CLICK_GRACE) {
            tracing::debug!("click right after blur hide, keeping window hidden");
            return Ok(());
        }
        self.show(event.bounds)
    }

    fn create_window(&mut self) -> Result<(), MenuBarError> {
        self.backend.emit(MenuBarEvent::CreateWindow);
        let spec = WindowSpec {
            width: self.options.width,
            height: self.options.height,
            transparent: self.options.transparent,
            always_on_top: self.options.always_on_top,
            visible_on_all_workspaces: self.options.show_on_all_workspaces,
            index: self.options.index.clone(),
        };
        let window = self.backend.create_window(&spec)?;
        self.window = Some(window);
        tracing::debug!("tray window created");
        self.backend.emit(MenuBarEvent::AfterCreateWindow);
        Ok(())
    }

    /// Tray bounds to position against: fresh usable bounds win, then the cache
    fn resolve_bounds(&mut self, bounds: Option<Rect>) -> Option<Rect> {
        match bounds {
            Some(rect) if rect.is_usable() => {
                self.cached_bounds = Some(rect);
                Some(rect)
            }
            _ => self.cached_bounds,
        }
    }

    /// Where the window goes for the given tray bounds
    pub fn target_position(&self, tray: Option<Rect>, window: Size) -> Result<Point, MenuBarError> {
        let configured = self
            .options
            .window_position
            .unwrap_or_else(|| self.platform.default_anchor());
        let anchor = if tray.is_none() && configured.is_tray_relative() {
            self.platform.fallback_corner()
        } else {
            configured
        };

        let work_area = self.backend.work_area(tray)?;
        let computed = calculate(anchor, window, work_area, tray);
        Ok(Point {
            x: self.options.x.unwrap_or(computed.x),
            y: self.options.y.unwrap_or(computed.y),
        })
    }

    /// Show the window next to the tray icon, creating it if needed
    pub fn show(&mut self, bounds: Option<Rect>) -> Result<(), MenuBarError> {
        self.blur_hidden_at = None;
        if self.window.is_none() {
            self.create_window()?;
        }
        self.backend.emit(MenuBarEvent::Show);

        let tray = self.resolve_bounds(bounds);
        let size = match &self.window {
            Some(window) => window.size(),
            None => return Err(MenuBarError::Backend("window missing after create".into())),
        };
        let position = self.target_position(tray, size)?;

        if let Some(window) = self.window.as_mut() {
            window.set_position(position)?;
            window.show()?;
            window.focus()?;
        }
        tracing::debug!(x = position.x, y = position.y, "tray window shown");
        self.backend.emit(MenuBarEvent::AfterShow);
        Ok(())
    }

    pub fn hide(&mut self) -> Result<(), MenuBarError> {
        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };
        self.backend.emit(MenuBarEvent::Hide);
        window.hide()?;
        self.backend.emit(MenuBarEvent::AfterHide);
        Ok(())
    }

    /// The window lost focus
    pub fn focus_lost(&mut self) -> Result<(), MenuBarError> {
        self.focus_lost_at(Instant::now())
    }

    pub fn focus_lost_at(&mut self, now: Instant) -> Result<(), MenuBarError> {
        if self.options.always_on_top {
            self.backend.emit(MenuBarEvent::FocusLost);
            return Ok(());
        }
        if self.options.hide_on_blur && self.state() == WindowState::Visible {
            self.hide()?;
            self.blur_hidden_at = Some(now);
        }
        Ok(())
    }

    /// The window was closed; the next show creates a new one
    pub fn window_closed(&mut self) {
        if self.window.take().is_some() {
            tracing::debug!("tray window closed");
            self.backend.emit(MenuBarEvent::AfterClose);
        }
    }

    /// Reflect a status update in the tray. The only writer of [`TrayState`].
    pub fn apply_status(&mut self, status: &ElapsedStatus) -> Result<(), MenuBarError> {
        let icon = if status.is_active() {
            TrayIcon::Active
        } else {
            TrayIcon::Inactive
        };
        if icon != self.tray.icon {
            self.backend.set_icon(icon)?;
            self.tray.icon = icon;
        }

        let title = status.title();
        self.backend.set_title(title)?;
        if self.tray.title != title {
            self.tray.title = title.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeWindow {
        visible: bool,
        size: Size,
        position: Option<Point>,
    }

    impl MenuBarWindow for FakeWindow {
        fn is_visible(&self) -> bool {
            self.visible
        }

        fn size(&self) -> Size {
            self.size
        }

        fn set_position(&mut self, position: Point) -> Result<(), MenuBarError> {
            self.position = Some(position);
            Ok(())
        }

        fn show(&mut self) -> Result<(), MenuBarError> {
            self.visible = true;
            Ok(())
        }

        fn hide(&mut self) -> Result<(), MenuBarError> {
            self.visible = false;
            Ok(())
        }
    }

    struct FakeBackend {
        platform: Platform,
        work_area: Rect,
        windows_created: usize,
        icons: Vec<TrayIcon>,
        titles: Vec<String>,
        tooltip: Option<String>,
        events: Vec<MenuBarEvent>,
    }

    impl FakeBackend {
        fn new(platform: Platform) -> Self {
            Self {
                platform,
                work_area: Rect::new(0, 25, 1440, 875),
                windows_created: 0,
                icons: Vec::new(),
                titles: Vec::new(),
                tooltip: None,
                events: Vec::new(),
            }
        }
    }

    impl MenuBarBackend for FakeBackend {
        type Window = FakeWindow;

        fn platform(&self) -> Platform {
            self.platform
        }

        fn create_window(&mut self, spec: &WindowSpec) -> Result<FakeWindow, MenuBarError> {
            self.windows_created += 1;
            Ok(FakeWindow {
                visible: false,
                size: Size {
                    width: spec.width,
                    height: spec.height,
                },
                position: None,
            })
        }

        fn work_area(&self, _near: Option<Rect>) -> Result<Rect, MenuBarError> {
            Ok(self.work_area)
        }

        fn set_icon(&mut self, icon: TrayIcon) -> Result<(), MenuBarError> {
            self.icons.push(icon);
            Ok(())
        }

        fn set_title(&mut self, title: &str) -> Result<(), MenuBarError> {
            self.titles.push(title.to_string());
            Ok(())
        }

        fn set_tooltip(&mut self, tooltip: &str) -> Result<(), MenuBarError> {
            self.tooltip = Some(tooltip.to_string());
            Ok(())
        }

        fn emit(&mut self, event: MenuBarEvent) {
            self.events.push(event);
        }
    }

    const TRAY: Rect = Rect {
        x: 1000,
        y: 0,
        width: 22,
        height: 22,
    };

    fn menubar(options: MenuBarOptions) -> MenuBar<FakeBackend> {
        MenuBar::new(FakeBackend::new(Platform::MacOs), options).unwrap()
    }

    fn left_click(bounds: Option<Rect>) -> ClickEvent {
        ClickEvent::new(ClickKind::Left, bounds)
    }

    fn position(bar: &MenuBar<FakeBackend>) -> Point {
        bar.window().unwrap().position.unwrap()
    }

    #[test]
    fn starts_without_window_and_inactive() {
        let bar = menubar(MenuBarOptions::default());
        assert_eq!(bar.state(), WindowState::NoWindow);
        assert_eq!(bar.tray().icon, TrayIcon::Inactive);
        assert_eq!(bar.backend().tooltip.as_deref(), Some("Timebar"));
        assert_eq!(bar.backend().events, vec![MenuBarEvent::Ready]);
    }

    #[test]
    fn preload_creates_hidden_window() {
        let bar = menubar(MenuBarOptions {
            preload_window: true,
            ..MenuBarOptions::default()
        });
        assert_eq!(bar.state(), WindowState::Hidden);
        assert_eq!(bar.backend().windows_created, 1);
    }

    #[test]
    fn click_toggles_window_next_to_tray() {
        let mut bar = menubar(MenuBarOptions::default());

        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
        assert_eq!(position(&bar), Point { x: 1000 + 11 - 150, y: 25 });

        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);

        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
        assert_eq!(bar.backend().windows_created, 1);
    }

    #[test]
    fn lifecycle_events_are_emitted_in_order() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.click(left_click(Some(TRAY))).unwrap();
        bar.hide().unwrap();
        bar.window_closed();
        assert_eq!(
            bar.backend().events,
            vec![
                MenuBarEvent::Ready,
                MenuBarEvent::CreateWindow,
                MenuBarEvent::AfterCreateWindow,
                MenuBarEvent::Show,
                MenuBarEvent::AfterShow,
                MenuBarEvent::Hide,
                MenuBarEvent::AfterHide,
                MenuBarEvent::AfterClose,
            ]
        );
    }

    #[test]
    fn modifier_click_always_hides() {
        let mut bar = menubar(MenuBarOptions::default());
        let mut event = left_click(Some(TRAY));
        event.modifiers.meta = true;

        // Hidden stays hidden (and no window gets created)
        bar.click(event).unwrap();
        assert_eq!(bar.state(), WindowState::NoWindow);

        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);

        bar.click(event).unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);
        bar.click(event).unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);
    }

    #[test]
    fn closed_window_is_recreated_on_next_click() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.click(left_click(Some(TRAY))).unwrap();
        bar.window_closed();
        assert_eq!(bar.state(), WindowState::NoWindow);

        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
        assert_eq!(bar.backend().windows_created, 2);
    }

    #[test]
    fn double_click_without_bounds_reuses_cached_bounds() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.click(left_click(Some(TRAY))).unwrap();
        let first = position(&bar);
        bar.hide().unwrap();

        bar.click(ClickEvent::new(ClickKind::Double, None)).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
        assert_eq!(position(&bar), first);
        assert_eq!(bar.cached_bounds(), Some(TRAY));
    }

    #[test]
    fn zeroed_bounds_do_not_replace_cache() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.show(Some(TRAY)).unwrap();
        bar.hide().unwrap();
        bar.show(Some(Rect::default())).unwrap();
        assert_eq!(bar.cached_bounds(), Some(TRAY));
        assert_eq!(position(&bar).x, 1000 + 11 - 150);
    }

    #[test]
    fn unknown_bounds_fall_back_to_top_right() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.show(None).unwrap();
        assert_eq!(position(&bar), Point { x: 1440 - 300, y: 25 });
    }

    #[test]
    fn unknown_bounds_on_windows_fall_back_to_bottom_right() {
        let backend = FakeBackend::new(Platform::Windows);
        let mut bar = MenuBar::new(backend, MenuBarOptions::default()).unwrap();
        bar.show(Some(Rect::default())).unwrap();
        assert_eq!(position(&bar), Point { x: 1140, y: 25 + 875 - 400 });
    }

    #[test]
    fn screen_anchor_ignores_missing_bounds() {
        let mut bar = menubar(MenuBarOptions {
            window_position: Some(Anchor::Center),
            ..MenuBarOptions::default()
        });
        bar.show(None).unwrap();
        assert_eq!(position(&bar), Point { x: 570, y: 262 });
    }

    #[test]
    fn explicit_coordinates_win() {
        let mut bar = menubar(MenuBarOptions {
            x: Some(5),
            ..MenuBarOptions::default()
        });
        bar.show(Some(TRAY)).unwrap();
        assert_eq!(position(&bar), Point { x: 5, y: 25 });
    }

    #[test]
    fn right_click_mode_ignores_left_clicks() {
        let mut bar = menubar(MenuBarOptions {
            show_on_right_click: true,
            ..MenuBarOptions::default()
        });
        bar.click(left_click(Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::NoWindow);
        bar.click(ClickEvent::new(ClickKind::Right, Some(TRAY))).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
    }

    #[test]
    fn focus_loss_hides_by_default() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.show(Some(TRAY)).unwrap();
        bar.focus_lost().unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);
    }

    #[test]
    fn click_right_after_blur_hide_keeps_window_hidden() {
        let mut bar = menubar(MenuBarOptions::default());
        let t0 = Instant::now();
        bar.click_at(left_click(Some(TRAY)), t0).unwrap();
        assert_eq!(bar.state(), WindowState::Visible);

        // Pressing the icon steals focus before the click arrives
        bar.focus_lost_at(t0 + Duration::from_secs(5)).unwrap();
        bar.click_at(left_click(Some(TRAY)), t0 + Duration::from_millis(5050))
            .unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);

        bar.click_at(left_click(Some(TRAY)), t0 + Duration::from_millis(5100))
            .unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
    }

    #[test]
    fn click_long_after_blur_hide_shows_window() {
        let mut bar = menubar(MenuBarOptions::default());
        let t0 = Instant::now();
        bar.click_at(left_click(Some(TRAY)), t0).unwrap();
        bar.focus_lost_at(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(bar.state(), WindowState::Hidden);

        bar.click_at(left_click(Some(TRAY)), t0 + Duration::from_secs(3))
            .unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
    }

    #[test]
    fn blur_without_visible_window_does_not_swallow_clicks() {
        let mut bar = menubar(MenuBarOptions::default());
        let t0 = Instant::now();
        bar.focus_lost_at(t0).unwrap();
        bar.click_at(left_click(Some(TRAY)), t0 + Duration::from_millis(10))
            .unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
    }

    #[test]
    fn focus_loss_with_always_on_top_only_notifies() {
        let mut bar = menubar(MenuBarOptions {
            always_on_top: true,
            ..MenuBarOptions::default()
        });
        bar.show(Some(TRAY)).unwrap();
        bar.focus_lost().unwrap();
        assert_eq!(bar.state(), WindowState::Visible);
        assert_eq!(bar.backend().events.last(), Some(&MenuBarEvent::FocusLost));
    }

    #[test]
    fn hide_without_window_is_noop() {
        let mut bar = menubar(MenuBarOptions::default());
        bar.hide().unwrap();
        bar.focus_lost().unwrap();
        assert_eq!(bar.backend().events, vec![MenuBarEvent::Ready]);
    }

    #[test]
    fn status_drives_icon_and_title() {
        let mut bar = menubar(MenuBarOptions::default());

        bar.apply_status(&ElapsedStatus::inactive()).unwrap();
        assert_eq!(bar.tray().icon, TrayIcon::Inactive);
        assert_eq!(bar.tray().title, "");

        bar.apply_status(&ElapsedStatus::active("00:00:01")).unwrap();
        bar.apply_status(&ElapsedStatus::active("00:00:02")).unwrap();
        assert_eq!(bar.tray().icon, TrayIcon::Active);
        assert_eq!(bar.tray().title, "00:00:02");

        bar.apply_status(&ElapsedStatus::inactive()).unwrap();
        assert_eq!(bar.tray().icon, TrayIcon::Inactive);
        assert_eq!(bar.tray().title, "");

        // Initial icon, then one swap each way; titles set on every update
        assert_eq!(
            bar.backend().icons,
            vec![TrayIcon::Inactive, TrayIcon::Active, TrayIcon::Inactive]
        );
        assert_eq!(bar.backend().titles, vec!["", "00:00:01", "00:00:02", ""]);
    }
}
