// Error types shared by the source client, the CalDAV client and the sync driver.
use thiserror::Error;

/// Failures talking to the task service.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid request to {url}: {message}")]
    Request { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the CalDAV server.
#[derive(Debug, Error)]
pub enum DavError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("no current-user-principal advertised by the server")]
    NoPrincipal,

    #[error("no calendar-home-set advertised by the server")]
    NoHomeSet,

    #[error("{method} {path} failed: {message}")]
    Request {
        method: String,
        path: String,
        message: String,
    },

    #[error("{method} {path} answered {status}")]
    Status {
        method: String,
        path: String,
        status: u16,
    },

    #[error("malformed multistatus response: {0}")]
    Xml(String),
}

/// Errors that end a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("task service: {0}")]
    Source(#[from] SourceError),

    #[error("project {0} is not known to the task service")]
    ProjectNotFound(String),

    #[error("CalDAV: {0}")]
    Dav(#[from] DavError),

    #[error("calendar for project {0} is missing after creation")]
    CalendarMissing(String),
}

impl SyncError {
    /// Missing source data that the run cannot do without.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Source(_) | Self::ProjectNotFound(_))
    }
}
