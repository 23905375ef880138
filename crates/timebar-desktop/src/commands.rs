//! Tauri command handlers exposed to the popup page.

use serde::Serialize;
use tauri::State;
use timebar_core::{PLACEHOLDER, TimeEntry, format_duration};

use crate::state::AppState;

/// A time entry as shown in the popup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub id: u64,
    pub note: Option<String>,
    pub duration: String,
}

impl From<&TimeEntry> for EntryView {
    fn from(entry: &TimeEntry) -> Self {
        let duration = format_duration(entry.quantity).unwrap_or_else(|e| {
            tracing::debug!(id = entry.id, "unformattable quantity: {e}");
            PLACEHOLDER.to_string()
        });
        Self {
            id: entry.id,
            note: entry.note.clone(),
            duration,
        }
    }
}

pub fn entry_views(entries: &[TimeEntry]) -> Vec<EntryView> {
    entries.iter().map(EntryView::from).collect()
}

/// Current elapsed time, or the placeholder while no timer runs
#[tauri::command]
pub fn get_elapsed(state: State<'_, AppState>) -> String {
    state.elapsed().display().to_string()
}

#[tauri::command]
pub fn get_time_entries(state: State<'_, AppState>) -> Vec<EntryView> {
    entry_views(&state.entries())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(quantity: f64) -> TimeEntry {
        TimeEntry {
            id: 7,
            quantity,
            note: Some("Review".into()),
            date: None,
        }
    }

    #[test]
    fn entry_view_formats_quantity() {
        let view = EntryView::from(&entry(3725.0));
        assert_eq!(view.duration, "01:02:05");
        assert_eq!(view.note.as_deref(), Some("Review"));
    }

    #[test]
    fn negative_quantity_shows_placeholder() {
        assert_eq!(EntryView::from(&entry(-1.0)).duration, "--:--:--");
    }
}
