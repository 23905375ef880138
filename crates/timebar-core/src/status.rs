//! One-way status channel from the poller process to the tray process.
//!
//! Messages are newline-delimited JSON over a local socket (abstract
//! namespace where supported, otherwise a socket file in the runtime dir).
//! There are no acknowledgements: the receiver keeps only the newest value of
//! each message kind, so a slow consumer always sees the latest snapshot.

use async_trait::async_trait;
use interprocess::local_socket::{
    GenericFilePath, GenericNamespaced, ListenerOptions, Name, ToFsName, ToNsName,
    tokio::{Listener, Stream, prelude::*},
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};

use crate::api::TimeEntry;
use crate::duration::PLACEHOLDER;

const SOCKET_NAME: &str = "timebar-status.sock";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid socket name {0}: {1}")]
    Name(String, #[source] io::Error),
    #[error("failed to bind status socket {0}: {1}")]
    Bind(String, #[source] io::Error),
    #[error("could not connect to status socket {0}: {1}")]
    Connect(String, #[source] io::Error),
    #[error("failed to write status message: {0}")]
    Write(#[source] io::Error),
    #[error("failed to encode status message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("status receiver is gone")]
    Closed,
}

/// Elapsed time of the running timer, `None` while no timer is active
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedStatus {
    pub elapsed: Option<String>,
}

impl ElapsedStatus {
    pub fn active(elapsed: impl Into<String>) -> Self {
        Self {
            elapsed: Some(elapsed.into()),
        }
    }

    pub fn inactive() -> Self {
        Self { elapsed: None }
    }

    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Text for the tray title (empty while inactive)
    pub fn title(&self) -> &str {
        self.elapsed.as_deref().unwrap_or("")
    }

    /// Text for the popup (placeholder while inactive)
    pub fn display(&self) -> &str {
        self.elapsed.as_deref().unwrap_or(PLACEHOLDER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StatusMessage {
    /// Sent on every poller tick, changed or not
    ElapsedTime {
        #[serde(default)]
        elapsed: Option<String>,
    },
    /// The day's entries for the popup
    TimeEntries { entries: Vec<TimeEntry> },
    /// The credential file was rewritten and should be re-read
    CredentialsUpdated,
}

impl From<ElapsedStatus> for StatusMessage {
    fn from(status: ElapsedStatus) -> Self {
        StatusMessage::ElapsedTime {
            elapsed: status.elapsed,
        }
    }
}

impl StatusMessage {
    /// Encode as a single JSON line
    pub fn encode(&self) -> Result<String, ChannelError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

/// Where status messages are delivered
#[async_trait]
pub trait StatusSink: Send {
    async fn send(&mut self, message: &StatusMessage) -> Result<(), ChannelError>;
}

#[async_trait]
impl StatusSink for mpsc::UnboundedSender<StatusMessage> {
    async fn send(&mut self, message: &StatusMessage) -> Result<(), ChannelError> {
        mpsc::UnboundedSender::send(self, message.clone()).map_err(|_| ChannelError::Closed)
    }
}

/// Address of the status socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEndpoint {
    /// Abstract socket name (Linux, Windows named pipes)
    Namespaced(String),
    /// Socket file on disk
    File(PathBuf),
}

impl StatusEndpoint {
    /// The endpoint both processes of the current user agree on
    pub fn default_for_platform() -> Self {
        Self::for_user(
            dirs::runtime_dir(),
            GenericNamespaced::is_supported(),
            &current_user(),
        )
    }

    /// A per-user runtime dir wins; otherwise the name carries the user
    fn for_user(runtime_dir: Option<PathBuf>, namespaced: bool, user: &str) -> Self {
        if let Some(dir) = runtime_dir {
            return StatusEndpoint::File(dir.join(SOCKET_NAME));
        }
        let name = format!("timebar-status-{user}.sock");
        if namespaced {
            StatusEndpoint::Namespaced(name)
        } else {
            StatusEndpoint::File(std::env::temp_dir().join(name))
        }
    }

    fn name(&self) -> Result<Name<'static>, ChannelError> {
        let result = match self {
            StatusEndpoint::Namespaced(ns) => ns.clone().to_ns_name::<GenericNamespaced>(),
            StatusEndpoint::File(path) => path.clone().to_fs_name::<GenericFilePath>(),
        };
        result.map_err(|e| ChannelError::Name(self.to_string(), e))
    }
}

impl std::fmt::Display for StatusEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusEndpoint::Namespaced(ns) => write!(f, "@{ns}"),
            StatusEndpoint::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Login name reduced to characters that are safe in a socket name
fn current_user() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    let user: String = user
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if user.is_empty() {
        "default".to_string()
    } else {
        user
    }
}

/// Poller side of the channel.
///
/// Connects lazily and reconnects after any failure, so the poller keeps
/// running while no tray process is listening.
pub struct StatusSender {
    endpoint: StatusEndpoint,
    stream: Option<Stream>,
}

impl StatusSender {
    pub fn new(endpoint: StatusEndpoint) -> Self {
        Self {
            endpoint,
            stream: None,
        }
    }

    async fn connect(&mut self) -> Result<&mut Stream, ChannelError> {
        if self.stream.is_none() {
            let name = self.endpoint.name()?;
            let stream = Stream::connect(name)
                .await
                .map_err(|e| ChannelError::Connect(self.endpoint.to_string(), e))?;
            tracing::info!("connected to status socket {}", self.endpoint);
            self.stream = Some(stream);
        }
        self.stream.as_mut().ok_or(ChannelError::Closed)
    }
}

#[async_trait]
impl StatusSink for StatusSender {
    async fn send(&mut self, message: &StatusMessage) -> Result<(), ChannelError> {
        let line = message.encode()?;
        let stream = self.connect().await?;
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            self.stream = None;
            return Err(ChannelError::Write(e));
        }
        Ok(())
    }
}

/// Send a single message and disconnect
pub async fn send_once(
    endpoint: &StatusEndpoint,
    message: &StatusMessage,
) -> Result<(), ChannelError> {
    let mut sender = StatusSender::new(endpoint.clone());
    sender.send(message).await
}

/// Latest value of every message kind
#[derive(Clone)]
pub struct StatusUpdates {
    pub elapsed: watch::Receiver<ElapsedStatus>,
    pub entries: watch::Receiver<Vec<TimeEntry>>,
    /// Bumped on every `credentials-updated` signal
    pub credentials: watch::Receiver<u64>,
}

struct StatusPublisher {
    elapsed: watch::Sender<ElapsedStatus>,
    entries: watch::Sender<Vec<TimeEntry>>,
    credentials: watch::Sender<u64>,
}

impl StatusPublisher {
    fn new() -> (Self, StatusUpdates) {
        let (elapsed, elapsed_rx) = watch::channel(ElapsedStatus::inactive());
        let (entries, entries_rx) = watch::channel(Vec::new());
        let (credentials, credentials_rx) = watch::channel(0);
        (
            Self {
                elapsed,
                entries,
                credentials,
            },
            StatusUpdates {
                elapsed: elapsed_rx,
                entries: entries_rx,
                credentials: credentials_rx,
            },
        )
    }

    /// Overwrite the stored value; every message marks the kind as changed
    fn publish(&self, message: StatusMessage) {
        match message {
            StatusMessage::ElapsedTime { elapsed } => {
                self.elapsed.send_replace(ElapsedStatus { elapsed });
            }
            StatusMessage::TimeEntries { entries } => {
                self.entries.send_replace(entries);
            }
            StatusMessage::CredentialsUpdated => {
                self.credentials.send_modify(|n| *n += 1);
            }
        }
    }
}

/// Tray side of the channel
pub struct StatusReceiver {
    endpoint: StatusEndpoint,
    listener: Listener,
    publisher: StatusPublisher,
    updates: StatusUpdates,
}

impl StatusReceiver {
    /// Bind the socket, reclaiming a stale socket file left by a crashed run.
    ///
    /// A socket file that still accepts connections belongs to a running
    /// receiver and is left alone.
    pub async fn bind(endpoint: StatusEndpoint) -> Result<Self, ChannelError> {
        let listener = match Self::create_listener(&endpoint) {
            Err(ChannelError::Bind(_, e)) if e.kind() == io::ErrorKind::AddrInUse => {
                let StatusEndpoint::File(path) = &endpoint else {
                    return Err(ChannelError::Bind(endpoint.to_string(), e));
                };
                if Stream::connect(endpoint.name()?).await.is_ok() {
                    return Err(ChannelError::Bind(endpoint.to_string(), e));
                }
                tracing::warn!("removing stale status socket {}", path.display());
                std::fs::remove_file(path)
                    .map_err(|e| ChannelError::Bind(endpoint.to_string(), e))?;
                Self::create_listener(&endpoint)?
            }
            other => other?,
        };

        tracing::info!("status channel listening on {endpoint}");
        let (publisher, updates) = StatusPublisher::new();
        Ok(Self {
            endpoint,
            listener,
            publisher,
            updates,
        })
    }

    fn create_listener(endpoint: &StatusEndpoint) -> Result<Listener, ChannelError> {
        ListenerOptions::new()
            .name(endpoint.name()?)
            .create_tokio()
            .map_err(|e| ChannelError::Bind(endpoint.to_string(), e))
    }

    pub fn updates(&self) -> StatusUpdates {
        self.updates.clone()
    }

    /// Accept senders until the task is dropped
    pub async fn run(self) {
        let publisher = std::sync::Arc::new(self.publisher);
        loop {
            match self.listener.accept().await {
                Ok(stream) => {
                    tracing::debug!("status sender connected on {}", self.endpoint);
                    let publisher = std::sync::Arc::clone(&publisher);
                    tokio::spawn(async move {
                        let mut lines = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match StatusMessage::decode(&line) {
                                Ok(message) => publisher.publish(message),
                                Err(e) => {
                                    tracing::trace!("failed to parse status message: {e} (line: {line})")
                                }
                            }
                        }
                        tracing::debug!("status sender disconnected");
                    });
                }
                Err(e) => tracing::warn!("failed to accept status connection: {e}"),
            }
        }
    }
}
