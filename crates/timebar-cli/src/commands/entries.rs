use anyhow::Result;
use chrono::{Local, NaiveDate};
use timebar_core::{PLACEHOLDER, TimeEntry, TimeTrackingApi, format_duration};

use crate::app;

pub async fn run(date: Option<NaiveDate>) -> Result<()> {
    let config = app::load_config()?;
    let api = app::connect(&config)?;

    let date = date
        .or(config.poll.entries_date)
        .unwrap_or_else(|| Local::now().date_naive());
    let entries = api.time_entries(date).await?;

    if entries.is_empty() {
        println!("No time entries on {date}");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", entry_line(entry));
    }
    Ok(())
}

fn entry_line(entry: &TimeEntry) -> String {
    let duration = format_duration(entry.quantity).unwrap_or_else(|_| PLACEHOLDER.to_string());
    match &entry.note {
        Some(note) => format!("{duration}  #{}  {note}", entry.id),
        None => format!("{duration}  #{}", entry.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_with_note() {
        let entry = TimeEntry {
            id: 12,
            quantity: 5400.0,
            note: Some("Planning".into()),
            date: None,
        };
        assert_eq!(entry_line(&entry), "01:30:00  #12  Planning");
    }

    #[test]
    fn line_with_invalid_quantity() {
        let entry = TimeEntry {
            id: 3,
            quantity: f64::NAN,
            note: None,
            date: None,
        };
        assert_eq!(entry_line(&entry), "--:--:--  #3");
    }
}
