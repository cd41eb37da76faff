use chrono::NaiveDateTime;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{CalendarEvent, ProcessedResult};

const PRODID: &str = "-//Desktop Declutter Agent//EN";

/// jCal property: `[name, {params}, type, value]`
fn property(name: &str, value_type: &str, value: &str) -> Value {
    json!([name, {}, value_type, value])
}

fn vevent(event: &CalendarEvent, index: usize, stamp: &str) -> Value {
    let (dt_type, dtstart) = match event.time_of_day() {
        Some(time) => ("date-time", format!("{}T{time}:00", event.date)),
        None => ("date", event.date.clone()),
    };

    let mut props = vec![
        property(
            "uid",
            "text",
            &format!("event-{index}-{}@desktop-declutter", event.date),
        ),
        property("summary", "text", &event.title),
        property("dtstart", dt_type, &dtstart),
    ];
    if !event.description.is_empty() {
        props.push(property("description", "text", &event.description));
    }
    if let Some(source) = event.source_file.as_deref().filter(|s| !s.is_empty()) {
        props.push(property("x-source-file", "text", source));
    }
    props.push(property("dtstamp", "date-time", stamp));

    json!(["vevent", props, []])
}

/// Renders calendar events as an RFC 7265 jCal document
pub struct CalendarWriter {
    calendar_dir: PathBuf,
}

impl CalendarWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            calendar_dir: output_dir.join("calendar"),
        }
    }

    pub fn events_path(&self) -> PathBuf {
        self.calendar_dir.join("events.json")
    }

    pub fn build(events: &[CalendarEvent], stamped_at: NaiveDateTime) -> Value {
        let stamp = stamped_at.format("%Y-%m-%dT%H:%M:%S").to_string();
        let components: Vec<Value> = events
            .iter()
            .enumerate()
            .map(|(i, event)| vevent(event, i, &stamp))
            .collect();

        json!([
            "vcalendar",
            [
                property("version", "text", "2.0"),
                property("prodid", "text", PRODID),
                property("calscale", "text", "GREGORIAN"),
            ],
            components
        ])
    }

    pub fn write(&self, result: &ProcessedResult, stamped_at: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(&self.calendar_dir)?;
        let path = self.events_path();
        let jcal = Self::build(&result.calendar_events, stamped_at);
        fs::write(&path, serde_json::to_string_pretty(&jcal)?)?;
        tracing::info!(
            path = %path.display(),
            events = result.calendar_events.len(),
            "Calendar written"
        );
        Ok(path)
    }
}
