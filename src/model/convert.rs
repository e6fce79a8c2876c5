// File: ./src/model/convert.rs
// Scalar conversions between the task service and iCalendar.
use crate::model::item::{DueDate, SourceTask};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Task service priority (4 = urgent .. 1 = normal) to iCalendar PRIORITY (1 = highest).
///
/// Priority 1 is the service's default and maps to "no priority" rather than the
/// lowest iCalendar value.
pub fn convert_priority(priority: Option<u8>) -> Option<u8> {
    match priority {
        Some(2) => Some(8),
        Some(3) => Some(5),
        Some(4) => Some(2),
        _ => None,
    }
}

/// Parses the due descriptor of a task. Unparseable values are logged and dropped.
pub fn due_date_from(task: &SourceTask) -> Option<DueDate> {
    let due = task.due.as_ref()?;
    let parsed = if let Some(datetime) = &due.datetime {
        parse_due_datetime(datetime)
    } else if let Some(date) = &due.date {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| DueDate::Floating(d.and_time(chrono::NaiveTime::MIN)))
            .map_err(|e| (date.as_str(), e.to_string()))
    } else {
        return None;
    };

    match parsed {
        Ok(due_date) => Some(due_date),
        Err((value, e)) => {
            log::error!("{} :  {}", value, e);
            None
        }
    }
}

fn parse_due_datetime(value: &str) -> Result<DueDate, (&str, String)> {
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => Ok(DueDate::Floating(dt)),
        // Tasks pinned to a timezone come back as RFC 3339 instants.
        Err(e) => DateTime::parse_from_rfc3339(value)
            .map(|dt| DueDate::Utc(dt.with_timezone(&Utc)))
            .map_err(|_| (value, e.to_string())),
    }
}
