use std::sync::{Mutex, MutexGuard, PoisonError};

use timebar_core::{Config, ElapsedStatus, MenuBar, MenuBarError, TimeEntry};

use crate::backend::TauriBackend;
use crate::poller::PollerProcess;

pub struct AppState {
    pub config: Config,
    /// Installed during setup, once the tray icon exists
    menubar: Mutex<Option<MenuBar<TauriBackend>>>,
    /// Latest status received from the poller
    elapsed: Mutex<ElapsedStatus>,
    entries: Mutex<Vec<TimeEntry>>,
    poller: Mutex<Option<PollerProcess>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            menubar: Mutex::new(None),
            elapsed: Mutex::new(ElapsedStatus::inactive()),
            entries: Mutex::new(Vec::new()),
            poller: Mutex::new(None),
        }
    }

    pub fn install_menubar(&self, menubar: MenuBar<TauriBackend>) {
        *lock(&self.menubar) = Some(menubar);
    }

    /// Run `f` against the controller, logging any backend failure.
    /// Must be called on the main thread.
    pub fn with_menubar<F>(&self, f: F)
    where
        F: FnOnce(&mut MenuBar<TauriBackend>) -> Result<(), MenuBarError>,
    {
        let mut guard = lock(&self.menubar);
        let Some(menubar) = guard.as_mut() else {
            tracing::debug!("menubar not ready, dropping update");
            return;
        };
        if let Err(e) = f(menubar) {
            tracing::warn!("menubar update failed: {e}");
        }
    }

    pub fn elapsed(&self) -> ElapsedStatus {
        lock(&self.elapsed).clone()
    }

    pub fn set_elapsed(&self, status: ElapsedStatus) {
        *lock(&self.elapsed) = status;
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        lock(&self.entries).clone()
    }

    pub fn set_entries(&self, entries: Vec<TimeEntry>) {
        *lock(&self.entries) = entries;
    }

    /// Start the poller child, replacing a running one
    pub fn restart_poller(&self) {
        let mut poller = lock(&self.poller);
        if let Some(mut old) = poller.take() {
            old.stop();
        }
        match PollerProcess::spawn() {
            Ok(process) => *poller = Some(process),
            Err(e) => tracing::error!("failed to start poller: {e:#}"),
        }
    }

    pub fn stop_poller(&self) {
        if let Some(mut process) = lock(&self.poller).take() {
            process.stop();
        }
    }
}
