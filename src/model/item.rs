// File: ./src/model/item.rs
use crate::model::recurrence::RecurrenceRule;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// --- SOURCE (task service) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Due descriptor as sent by the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    /// Date-only form, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// Date-time form, present only when the due has a time of day.
    #[serde(default)]
    pub datetime: Option<String>,
    /// Natural-language form as typed by the user ("every monday 3 PM").
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub is_recurring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTask {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_source_priority")]
    pub priority: u8,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub comment_count: u32,
}

fn default_source_priority() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub content: String,
}

// --- DESTINATION (CalDAV) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarListEntry {
    pub name: String,
    pub href: String,
    pub color: Option<String>,
}

// --- DATE TYPES ---

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DueDate {
    /// Wall-clock time without a zone (written as a floating DUE).
    Floating(NaiveDateTime),
    /// Fixed instant (written with a trailing `Z`).
    Utc(DateTime<Utc>),
}

impl DueDate {
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            DueDate::Floating(dt) => *dt,
            DueDate::Utc(dt) => dt.naive_utc(),
        }
    }

    /// iCalendar DATE-TIME value form.
    pub fn to_ical(&self) -> String {
        match self {
            DueDate::Floating(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            DueDate::Utc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

/// A VTODO ready to be written to a calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub uid: String,
    pub summary: String,
    pub description: String,
    /// 1 (highest) ..= 9 (lowest). `None` leaves PRIORITY out.
    pub priority: Option<u8>,
    pub sort_order: i64,
    pub due: Option<DueDate>,
    pub rrule: Option<RecurrenceRule>,
    pub categories: Vec<String>,
    /// Parent UID. Only ever set once the parent is known to exist remotely.
    pub related_to: Option<String>,
}

impl Todo {
    pub fn new(uid: &str, summary: &str) -> Self {
        Self {
            uid: uid.to_string(),
            summary: summary.to_string(),
            description: String::new(),
            priority: None,
            sort_order: 0,
            due: None,
            rrule: None,
            categories: Vec::new(),
            related_to: None,
        }
    }
}
