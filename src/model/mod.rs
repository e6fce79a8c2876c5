// File: ./src/model/mod.rs
pub mod adapter;
pub mod convert;
pub mod item;
pub mod recurrence;

pub use item::{CalendarListEntry, Comment, Due, DueDate, Project, SourceTask, Todo};
pub use recurrence::{Frequency, RecurrenceRule};
