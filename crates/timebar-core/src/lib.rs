pub mod api;
pub mod config;
pub mod credentials;
pub mod duration;
pub mod menubar;
pub mod poller;
pub mod status;

pub use api::{ActiveTimer, ApiError, HttpApi, TimeEntry, TimeTrackingApi, Timer};
pub use config::{Config, PollSettings};
pub use credentials::{Credentials, CredentialsError};
pub use duration::{DurationError, PLACEHOLDER, format_duration, parse_duration};
pub use menubar::{
    ClickEvent, ClickKind, MenuBar, MenuBarBackend, MenuBarError, MenuBarEvent, MenuBarOptions,
    MenuBarWindow, Modifiers, TrayIcon, WindowState,
};
pub use poller::TimerPoller;
pub use status::{
    ChannelError, ElapsedStatus, StatusEndpoint, StatusMessage, StatusReceiver, StatusSender,
    StatusSink, StatusUpdates, send_once,
};
