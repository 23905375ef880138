//! Poller role and the child process that runs it.

use std::process::{Child, Command};
use std::sync::Arc;

use anyhow::Context;
use timebar_core::{
    Config, Credentials, HttpApi, StatusEndpoint, StatusSender, TimerPoller,
};

/// Entry point for `timebar-desktop --poller`
pub fn run_poller_role() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async {
        let config = Config::load().context("failed to load settings")?;
        let credentials = Credentials::load(&config.credentials_path)
            .context("cannot start poller without credentials (run `timebar sign-in`)")?;
        let api = HttpApi::new(&config, credentials).context("failed to build API client")?;

        let endpoint = StatusEndpoint::default_for_platform();
        tracing::info!(%endpoint, api = %config.api_url, "poller role starting");
        let mut sender = StatusSender::new(endpoint);
        TimerPoller::new(Arc::new(api), config.poll.clone())
            .run(&mut sender)
            .await;
        Ok(())
    })
}

/// Handle to a `--poller` child of the tray process
pub struct PollerProcess {
    child: Child,
}

impl PollerProcess {
    pub fn spawn() -> anyhow::Result<Self> {
        let exe = std::env::current_exe().context("failed to locate own executable")?;
        let child = Command::new(&exe)
            .arg("--poller")
            .spawn()
            .with_context(|| format!("failed to spawn {} --poller", exe.display()))?;
        tracing::info!(pid = child.id(), "poller started");
        Ok(Self { child })
    }

    pub fn stop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(%status, "poller already exited");
                return;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("failed to query poller: {e}"),
        }
        if let Err(e) = self.child.kill() {
            tracing::warn!("failed to stop poller: {e}");
        }
        let _ = self.child.wait();
        tracing::info!(pid = self.child.id(), "poller stopped");
    }
}

impl Drop for PollerProcess {
    fn drop(&mut self) {
        self.stop();
    }
}
