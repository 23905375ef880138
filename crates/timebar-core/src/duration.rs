//! Elapsed-time formatting.
//!
//! Durations are rendered as `HH:MM:SS`. Every field is padded to at least two
//! digits; hours keep growing past `99`.

use thiserror::Error;

/// Shown in the popup while no timer is running
pub const PLACEHOLDER: &str = "--:--:--";

#[derive(Debug, Error, PartialEq)]
pub enum DurationError {
    #[error("duration is not a finite number: {0}")]
    NotFinite(f64),
    #[error("duration is negative: {0}")]
    Negative(f64),
    #[error("malformed duration '{0}', expected HH:MM:SS")]
    Malformed(String),
}

/// Format a number of seconds as `HH:MM:SS`.
///
/// Fractional seconds are truncated. Fails on `NaN`, infinities and negative
/// values instead of producing a garbled string.
pub fn format_duration(seconds: f64) -> Result<String, DurationError> {
    if !seconds.is_finite() {
        return Err(DurationError::NotFinite(seconds));
    }
    if seconds < 0.0 {
        return Err(DurationError::Negative(seconds));
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;

    Ok(format!("{hours:02}:{minutes:02}:{secs:02}"))
}

/// Parse an `HH:MM:SS` string back into whole seconds.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let malformed = || DurationError::Malformed(text.to_string());

    let mut fields = text.split(':');
    let (Some(h), Some(m), Some(s), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    let parse_field = |field: &str| -> Result<u64, DurationError> {
        if field.len() < 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        field.parse().map_err(|_| malformed())
    };

    let hours = parse_field(h)?;
    let minutes = parse_field(m)?;
    let secs = parse_field(s)?;
    if minutes > 59 || secs > 59 || m.len() != 2 || s.len() != 2 {
        return Err(malformed());
    }

    Ok(hours * 3600 + minutes * 60 + secs)
}
