//! Remote time-tracking API.
//!
//! ## Architecture
//!
//! ```text
//! api/
//! ├── models.rs  - Wire types and the joined ActiveTimer
//! ├── http.rs    - reqwest implementation (bearer auth on every call)
//! └── mod.rs     - TimeTrackingApi trait and errors (this file)
//! ```
//!
//! The poller only talks to [`TimeTrackingApi`], so tests drive it with an
//! in-memory fake.

mod http;
mod models;

pub use http::HttpApi;
pub use models::{ActiveTimer, ActivityRef, TimeEntry, Timer};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[async_trait]
pub trait TimeTrackingApi: Send + Sync {
    /// The running timer, `None` when the API answers "not found"
    async fn current_timer(&self) -> Result<Option<Timer>, ApiError>;

    /// A single time entry by id
    async fn time_entry(&self, id: u64) -> Result<TimeEntry, ApiError>;

    /// Entries assigned to the current user on `date`
    async fn time_entries(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, ApiError>;
}

/// Fetch the running timer and join it with its entry's logged quantity
pub async fn fetch_active_timer<A>(api: &A) -> Result<Option<ActiveTimer>, ApiError>
where
    A: TimeTrackingApi + ?Sized,
{
    let Some(timer) = api.current_timer().await? else {
        return Ok(None);
    };
    let entry = api.time_entry(timer.activity.id).await?;
    Ok(Some(ActiveTimer::new(timer, &entry)))
}
