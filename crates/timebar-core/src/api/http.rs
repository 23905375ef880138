//! HTTP client for the time-tracking API.
//!
//! Endpoints:
//! - `GET {base}/timer` - running timer, 404 when none
//! - `GET {base}/activities/{id}` - single time entry
//! - `GET {base}/activities?type=TimeEntry&query=AssignedToMe&from=D&to=D` - entries for a day
//!
//! Every request carries `Authorization: Bearer <token>`.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::models::{EntriesEnvelope, EntryEnvelope, TimerEnvelope};
use super::{ApiError, TimeEntry, TimeTrackingApi, Timer};
use crate::config::Config;
use crate::credentials::Credentials;

/// reqwest-backed [`TimeTrackingApi`]
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpApi {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, &config.api_url, credentials))
    }

    /// Build on a shared client (connection pooling across callers)
    pub fn with_client(client: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn entries_url(&self, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        self.url(&format!(
            "activities?type=TimeEntry&query=AssignedToMe&from={day}&to={day}"
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::trace!(url, "GET");
        let response = self
            .client
            .get(url)
            .header("Authorization", self.credentials.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl TimeTrackingApi for HttpApi {
    async fn current_timer(&self) -> Result<Option<Timer>, ApiError> {
        match self.get_json::<TimerEnvelope>(&self.url("timer")).await {
            Ok(envelope) => Ok(Some(envelope.timer)),
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn time_entry(&self, id: u64) -> Result<TimeEntry, ApiError> {
        let envelope: EntryEnvelope = self.get_json(&self.url(&format!("activities/{id}"))).await?;
        Ok(envelope.activity)
    }

    async fn time_entries(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, ApiError> {
        let envelope: EntriesEnvelope = self.get_json(&self.entries_url(date)).await?;
        Ok(envelope.activities)
    }
}
