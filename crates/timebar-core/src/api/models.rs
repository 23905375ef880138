use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Running timer as reported by `GET /timer`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Timer {
    pub id: u64,
    pub activity: ActivityRef,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityRef {
    pub id: u64,
}

/// A logged time entry (`activity` of type `TimeEntry` on the wire)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    /// Seconds already logged
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct TimerEnvelope {
    pub timer: Timer,
}

#[derive(Deserialize)]
pub(super) struct EntryEnvelope {
    pub activity: TimeEntry,
}

#[derive(Deserialize)]
pub(super) struct EntriesEnvelope {
    #[serde(default)]
    pub activities: Vec<TimeEntry>,
}

/// A running timer joined with the quantity its entry already holds
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTimer {
    pub timer_id: u64,
    pub entry_id: u64,
    pub start_time: DateTime<Utc>,
    pub logged_seconds: f64,
}

impl ActiveTimer {
    pub fn new(timer: Timer, entry: &TimeEntry) -> Self {
        Self {
            timer_id: timer.id,
            entry_id: timer.activity.id,
            start_time: timer.start_time,
            logged_seconds: entry.quantity,
        }
    }

    /// Logged seconds plus the time the timer has been running at `now`.
    ///
    /// A start time ahead of the local clock counts as zero running time.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        let running = (now - self.start_time).max(TimeDelta::zero());
        self.logged_seconds + running.num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn decodes_timer_envelope() {
        let json = r#"{"timer": {"id": 7, "activity": {"id": 42, "type": "TimeEntry"}, "start_time": "2016-06-06T10:00:00Z"}}"#;
        let envelope: TimerEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.timer.id, 7);
        assert_eq!(envelope.timer.activity.id, 42);
        assert_eq!(
            envelope.timer.start_time,
            Utc.with_ymd_and_hms(2016, 6, 6, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn malformed_start_time_fails_to_decode() {
        let json = r#"{"timer": {"id": 7, "activity": {"id": 42}, "start_time": "yesterday"}}"#;
        assert!(serde_json::from_str::<TimerEnvelope>(json).is_err());
    }

    #[test]
    fn decodes_entry_list() {
        let json = r#"{"activities": [{"id": 1, "quantity": 3600, "note": "Review"}, {"id": 2}]}"#;
        let envelope: EntriesEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.activities.len(), 2);
        assert_eq!(envelope.activities[0].quantity, 3600.0);
        assert_eq!(envelope.activities[1].quantity, 0.0);
        assert_eq!(envelope.activities[1].note, None);
    }

    #[test]
    fn elapsed_adds_logged_and_running_time() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let active = ActiveTimer {
            timer_id: 1,
            entry_id: 2,
            start_time: start,
            logged_seconds: 120.0,
        };
        assert_eq!(active.elapsed_at(start + Duration::seconds(30)), 150.0);
    }

    #[test]
    fn start_time_ahead_of_local_clock_counts_as_not_running() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let active = ActiveTimer {
            timer_id: 1,
            entry_id: 2,
            start_time: start,
            logged_seconds: 60.0,
        };
        assert_eq!(active.elapsed_at(start - Duration::seconds(120)), 60.0);
    }
}
