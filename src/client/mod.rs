// File: ./src/client/mod.rs
pub mod auth;
pub mod cert;
pub mod core;
pub mod middleware;
pub mod transport;

use crate::error::DavError;
use crate::model::{CalendarListEntry, Todo};

pub use crate::client::core::{APPLE_COLOR, DavClient};

/// The calendar side of a sync run.
///
/// `DavClient` talks to a real CalDAV server; tests substitute an in-memory store.
#[allow(async_fn_in_trait)]
pub trait CalendarStore {
    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, DavError>;

    /// Creates a collection named `name` at `<calendar-home>/<id>/` restricted to `components`.
    async fn create_calendar(
        &self,
        name: &str,
        id: &str,
        components: &[&str],
    ) -> Result<CalendarListEntry, DavError>;

    async fn set_calendar_color(
        &self,
        calendar: &CalendarListEntry,
        color: &str,
    ) -> Result<(), DavError>;

    async fn add_todo(&self, calendar: &CalendarListEntry, todo: &Todo) -> Result<(), DavError>;

    /// Href of the VTODO with `uid` in `calendar`, if present.
    async fn todo_by_uid(
        &self,
        calendar: &CalendarListEntry,
        uid: &str,
    ) -> Result<Option<String>, DavError>;
}
