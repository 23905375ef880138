use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use timebar_core::{ChannelError, StatusMessage, StatusSink, TimerPoller};

use crate::app;

/// Prints status messages instead of sending them to the tray
struct StdoutSink<W> {
    out: W,
    json: bool,
}

impl<W: Write> StdoutSink<W> {
    fn render(&self, message: &StatusMessage) -> Result<String, ChannelError> {
        if self.json {
            return message.encode();
        }
        Ok(match message {
            StatusMessage::ElapsedTime { elapsed } => {
                format!("{}\n", elapsed.as_deref().unwrap_or(timebar_core::PLACEHOLDER))
            }
            StatusMessage::TimeEntries { entries } => {
                format!("({} time entries today)\n", entries.len())
            }
            StatusMessage::CredentialsUpdated => "(credentials updated)\n".to_string(),
        })
    }
}

#[async_trait]
impl<W: Write + Send> StatusSink for StdoutSink<W> {
    async fn send(&mut self, message: &StatusMessage) -> Result<(), ChannelError> {
        let line = self.render(message)?;
        self.out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(ChannelError::Write)
    }
}

pub async fn run(json: bool) -> Result<()> {
    let config = app::load_config()?;
    let api = app::connect(&config)?;
    let poller = TimerPoller::new(Arc::new(api), config.poll.clone());

    let mut sink = StdoutSink {
        out: std::io::stdout(),
        json,
    };
    tokio::select! {
        _ = poller.run(&mut sink) => {}
        _ = tokio::signal::ctrl_c() => tracing::debug!("interrupted"),
    }
    Ok(())
}
