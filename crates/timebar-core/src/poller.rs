//! Timer poller.
//!
//! Three independent intervals drive the poller:
//! - check: request the running timer (a new request every tick, regardless of
//!   how long earlier ones take)
//! - emit: recompute elapsed time and send it, changed or not
//! - entries: refresh the day's time entries for the popup
//!
//! Requests are tagged with a generation when dispatched. A response is only
//! applied when it is newer than the last applied one, so a slow request can
//! never overwrite the result of a later one.

use chrono::{DateTime, Local, NaiveDate, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval};

use crate::api::{ActiveTimer, ApiError, TimeEntry, TimeTrackingApi, fetch_active_timer};
use crate::config::PollSettings;
use crate::duration::{DurationError, format_duration};
use crate::status::{ElapsedStatus, StatusMessage, StatusSink};

enum Completion {
    Timer {
        generation: u64,
        result: Result<Option<ActiveTimer>, ApiError>,
    },
    Entries(Result<Vec<TimeEntry>, ApiError>),
}

pub struct TimerPoller<A: ?Sized> {
    api: Arc<A>,
    settings: PollSettings,
    active: Option<ActiveTimer>,
    /// Generation of the most recently dispatched check
    dispatched: u64,
    /// Generation whose result is currently held in `active`
    applied: u64,
    sink_failing: bool,
}

impl<A> TimerPoller<A>
where
    A: TimeTrackingApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, settings: PollSettings) -> Self {
        Self {
            api,
            settings,
            active: None,
            dispatched: 0,
            applied: 0,
            sink_failing: false,
        }
    }

    pub fn active(&self) -> Option<&ActiveTimer> {
        self.active.as_ref()
    }

    fn next_generation(&mut self) -> u64 {
        self.dispatched += 1;
        self.dispatched
    }

    /// Apply the outcome of a timer check.
    ///
    /// Returns `true` if the state was updated. Errors leave the current timer
    /// untouched; results older than the applied generation are dropped.
    pub fn apply_check(
        &mut self,
        generation: u64,
        result: Result<Option<ActiveTimer>, ApiError>,
    ) -> bool {
        if generation <= self.applied {
            tracing::debug!(
                generation,
                applied = self.applied,
                "dropping stale timer response"
            );
            return false;
        }

        match result {
            Ok(active) => {
                if active.is_some() != self.active.is_some() {
                    match &active {
                        Some(timer) => tracing::info!(timer_id = timer.timer_id, "timer started"),
                        None => tracing::info!("timer stopped"),
                    }
                }
                self.active = active;
                self.applied = generation;
                true
            }
            Err(e) => {
                tracing::warn!("failed to fetch active timer: {e}");
                false
            }
        }
    }

    /// Elapsed time at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> Result<ElapsedStatus, DurationError> {
        match &self.active {
            Some(timer) => Ok(ElapsedStatus::active(format_duration(timer.elapsed_at(now))?)),
            None => Ok(ElapsedStatus::inactive()),
        }
    }

    /// Run a single check and apply it
    pub async fn check_once(&mut self) -> Result<(), ApiError> {
        let generation = self.next_generation();
        let active = fetch_active_timer(&*self.api).await?;
        self.apply_check(generation, Ok(active));
        Ok(())
    }

    fn entries_date(&self) -> NaiveDate {
        self.settings
            .entries_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn dispatch_check(&mut self) -> BoxFuture<'static, Completion> {
        let generation = self.next_generation();
        let api = Arc::clone(&self.api);
        async move {
            let result = fetch_active_timer(&*api).await;
            Completion::Timer { generation, result }
        }
        .boxed()
    }

    fn dispatch_entries(&self) -> BoxFuture<'static, Completion> {
        let date = self.entries_date();
        let api = Arc::clone(&self.api);
        async move { Completion::Entries(api.time_entries(date).await) }.boxed()
    }

    async fn send<S>(&mut self, sink: &mut S, message: StatusMessage)
    where
        S: StatusSink + ?Sized,
    {
        match sink.send(&message).await {
            Ok(()) => {
                if self.sink_failing {
                    tracing::info!("status channel recovered");
                }
                self.sink_failing = false;
            }
            Err(e) if !self.sink_failing => {
                tracing::warn!("failed to send status: {e}");
                self.sink_failing = true;
            }
            Err(e) => tracing::trace!("failed to send status: {e}"),
        }
    }

    async fn emit<S>(&mut self, sink: &mut S)
    where
        S: StatusSink + ?Sized,
    {
        match self.status_at(Utc::now()) {
            Ok(status) => self.send(sink, status.into()).await,
            Err(e) => tracing::warn!("skipping elapsed update: {e}"),
        }
    }

    async fn complete<S>(&mut self, sink: &mut S, completion: Completion)
    where
        S: StatusSink + ?Sized,
    {
        match completion {
            Completion::Timer { generation, result } => {
                self.apply_check(generation, result);
            }
            Completion::Entries(Ok(entries)) => {
                tracing::debug!(count = entries.len(), "refreshed time entries");
                self.send(sink, StatusMessage::TimeEntries { entries }).await;
            }
            Completion::Entries(Err(e)) => tracing::warn!("failed to fetch time entries: {e}"),
        }
    }

    /// Poll forever, sending status through `sink`
    pub async fn run<S>(mut self, sink: &mut S)
    where
        S: StatusSink + ?Sized,
    {
        let mut check = interval(self.settings.check_interval());
        let mut emit = interval(self.settings.emit_interval());
        let mut entries = interval(self.settings.entries_interval());
        for timer in [&mut check, &mut emit, &mut entries] {
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut in_flight: FuturesUnordered<BoxFuture<'static, Completion>> =
            FuturesUnordered::new();

        tracing::info!(
            check_ms = self.settings.check_interval_ms,
            emit_ms = self.settings.emit_interval_ms,
            "poller started"
        );

        loop {
            tokio::select! {
                _ = check.tick() => {
                    let request = self.dispatch_check();
                    in_flight.push(request);
                }
                _ = entries.tick() => {
                    in_flight.push(self.dispatch_entries());
                }
                Some(completion) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(sink, completion).await;
                }
                _ = emit.tick() => {
                    self.emit(sink).await;
                }
            }
        }
    }
}
