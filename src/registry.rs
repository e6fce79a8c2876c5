// File: ./src/registry.rs
// Maps project ids to the calendars already present on the CalDAV server.
use crate::client::CalendarStore;
use crate::error::DavError;
use crate::model::CalendarListEntry;
use std::collections::HashMap;

/// The calendar identifier is the second-to-last `/` segment of its href
/// (`/calendars/alice/<id>/` gives `<id>`).
pub fn calendar_id_from_href(href: &str) -> Option<String> {
    let segments: Vec<&str> = href.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let id = segments[segments.len() - 2];
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CalendarRegistry {
    calendars: HashMap<String, CalendarListEntry>,
}

impl CalendarRegistry {
    pub async fn load<D: CalendarStore>(store: &D) -> Result<Self, DavError> {
        let mut registry = Self::default();
        registry.refresh(store).await?;
        Ok(registry)
    }

    /// Re-enumerates every calendar on the server.
    pub async fn refresh<D: CalendarStore>(&mut self, store: &D) -> Result<(), DavError> {
        let calendars = store.list_calendars().await?;
        self.calendars = calendars
            .into_iter()
            .filter_map(|cal| match calendar_id_from_href(&cal.href) {
                Some(id) => Some((id, cal)),
                None => {
                    log::debug!("Ignoring calendar without identifier: {}", cal.href);
                    None
                }
            })
            .collect();
        log::debug!("Registry holds {} calendars", self.calendars.len());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CalendarListEntry> {
        self.calendars.get(id)
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}
