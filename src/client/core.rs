// File: src/client/core.rs
use crate::client::CalendarStore;
use crate::client::auth::{DynamicAuthLayer, DynamicAuthService};
use crate::client::middleware::{DefaultHeadersLayer, DefaultHeadersService};
use crate::client::transport::{self, HttpsClient};
use crate::error::DavError;
use crate::model::{CalendarListEntry, Todo};

// Libdav imports
use libdav::caldav::{FindCalendarHomeSet, FindCalendars};
use libdav::dav::{GetProperty, WebDavClient};
use libdav::{CalDavClient, PropertyName, names};

use http::{Request, Uri};
use tower_layer::Layer;

pub const APPLE_COLOR: PropertyName =
    PropertyName::new("http://apple.com/ns/ical/", "calendar-color");

const XML: &str = "application/xml; charset=utf-8";
const ICS: &str = "text/calendar; charset=utf-8";

type DavHttpClient = DynamicAuthService<DefaultHeadersService<HttpsClient>>;

pub fn strip_host(href: &str) -> String {
    if let Ok(uri) = href.parse::<Uri>()
        && (uri.scheme().is_some() || uri.authority().is_some())
    {
        return uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
    }
    href.to_string()
}

fn join_href(collection: &str, child: &str) -> String {
    if collection.ends_with('/') {
        format!("{}{}", collection, child)
    } else {
        format!("{}/{}", collection, child)
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn mkcalendar_body(name: &str, components: &[&str]) -> String {
    let comps: String = components
        .iter()
        .map(|c| format!(r#"<C:comp name="{}"/>"#, escape_xml(c)))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<C:mkcalendar xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:set>
    <D:prop>
      <D:displayname>{}</D:displayname>
      <C:supported-calendar-component-set>{}</C:supported-calendar-component-set>
    </D:prop>
  </D:set>
</C:mkcalendar>"#,
        escape_xml(name),
        comps
    )
}

pub fn color_proppatch_body(color: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:propertyupdate xmlns:D="DAV:" xmlns:I="http://apple.com/ns/ical/">
  <D:set>
    <D:prop>
      <I:calendar-color>{}</I:calendar-color>
    </D:prop>
  </D:set>
</D:propertyupdate>"#,
        escape_xml(color)
    )
}

pub fn uid_query_body(uid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:getetag/>
    <C:calendar-data/>
  </D:prop>
  <C:filter>
    <C:comp-filter name="VCALENDAR">
      <C:comp-filter name="VTODO">
        <C:prop-filter name="UID">
          <C:text-match collation="i;octet">{}</C:text-match>
        </C:prop-filter>
      </C:comp-filter>
    </C:comp-filter>
  </C:filter>
</C:calendar-query>"#,
        escape_xml(uid)
    )
}

/// One `<D:response>` of a multistatus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultistatusEntry {
    pub href: String,
    pub calendar_data: Option<String>,
}

/// Entries of a multistatus body, skipping 404 entries.
pub fn parse_multistatus(xml: &str) -> Result<Vec<MultistatusEntry>, DavError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| DavError::Xml(e.to_string()))?;
    let entries = doc
        .descendants()
        .filter(|n| n.has_tag_name(("DAV:", "response")))
        .filter(|response| {
            !response.children().any(|c| {
                c.has_tag_name(("DAV:", "status"))
                    && c.text().is_some_and(|t| t.contains(" 404"))
            })
        })
        .filter_map(|response| {
            let href = response
                .children()
                .find(|c| c.has_tag_name(("DAV:", "href")))
                .and_then(|h| h.text())
                .map(|t| t.trim().to_string())
                .filter(|h| !h.is_empty())?;
            let calendar_data = response
                .descendants()
                .find(|c| c.has_tag_name(("urn:ietf:params:xml:ns:caldav", "calendar-data")))
                .and_then(|c| c.text())
                .map(str::to_string);
            Some(MultistatusEntry {
                href,
                calendar_data,
            })
        })
        .collect();
    Ok(entries)
}

/// Value of the first `UID` property of an iCalendar body, after unfolding.
pub fn ics_uid(ics: &str) -> Option<String> {
    let unfolded = ics.replace("\r\n ", "").replace("\r\n\t", "").replace("\n ", "");
    unfolded.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        let name = name.split(';').next().unwrap_or(name);
        name.trim()
            .eq_ignore_ascii_case("UID")
            .then(|| value.trim().to_string())
    })
}

/// Href of the entry whose calendar data carries exactly `uid`.
///
/// `text-match` is a substring match, so the server may also return unrelated UIDs.
pub fn find_uid_href(entries: &[MultistatusEntry], uid: &str) -> Option<String> {
    entries
        .iter()
        .find(|e| e.calendar_data.as_deref().and_then(ics_uid).as_deref() == Some(uid))
        .map(|e| e.href.clone())
}

#[derive(Clone, Debug)]
pub struct DavClient {
    pub client: CalDavClient<DavHttpClient>,
}

impl DavClient {
    pub fn new(url: &str, user: &str, pass: &str, insecure: bool) -> Result<Self, DavError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| DavError::InvalidUrl(e.to_string()))?;

        let http_client = transport::build_https_client(&uri, insecure).map_err(DavError::Tls)?;
        let with_agent = DefaultHeadersLayer::new()
            .with(http::header::USER_AGENT, &transport::user_agent())
            .layer(http_client);
        let auth_client =
            DynamicAuthLayer::new(user.to_string(), pass.to_string()).layer(with_agent);

        let webdav = WebDavClient::new(uri, auth_client);
        let caldav = CalDavClient::new(webdav);
        Ok(Self { client: caldav })
    }

    fn base_path(&self) -> String {
        self.client.base_url().path().to_string()
    }

    // --- DISCOVERY ---

    /// Path of the first calendar-home-set of the current user principal.
    pub async fn calendar_home_set(&self) -> Result<String, DavError> {
        let principal = self
            .client
            .find_current_user_principal()
            .await
            .map_err(|e| self.request_error("PROPFIND", &self.base_path(), e))?
            .ok_or(DavError::NoPrincipal)?;

        let home_set_resp = self
            .client
            .request(FindCalendarHomeSet::new(principal.path()))
            .await
            .map_err(|e| self.request_error("PROPFIND", &principal.to_string(), e))?;

        let home_url = home_set_resp.home_sets.first().ok_or(DavError::NoHomeSet)?;
        Ok(strip_host(&home_url.to_string()))
    }

    // --- RAW REQUESTS ---

    /// Sends a request outside libdav's typed wrappers and returns the response body.
    async fn send_raw(
        &self,
        method: &str,
        path: &str,
        body: String,
        content_type: &str,
        depth: Option<&str>,
    ) -> Result<String, DavError> {
        let uri = self
            .client
            .webdav_client
            .relative_uri(path)
            .map_err(|e| DavError::InvalidUrl(format!("{}: {}", path, e)))?;

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, content_type);
        if let Some(depth) = depth {
            builder = builder.header("Depth", depth);
        }
        let req = builder
            .body(body)
            .map_err(|e| self.request_error(method, path, e))?;

        let (parts, bytes) = self
            .client
            .webdav_client
            .request_raw(req)
            .await
            .map_err(|e| self.request_error(method, path, e))?;

        if !parts.status.is_success() {
            return Err(DavError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: parts.status.as_u16(),
            });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// MKCALENDAR `<home>/<id>/`.
    pub async fn create_calendar_in(
        &self,
        home: &str,
        name: &str,
        id: &str,
        components: &[&str],
    ) -> Result<CalendarListEntry, DavError> {
        let href = join_href(home, &format!("{}/", id));
        log::info!("Creating calendar '{}' at {}", name, href);
        self.send_raw("MKCALENDAR", &href, mkcalendar_body(name, components), XML, None)
            .await?;
        Ok(CalendarListEntry {
            name: name.to_string(),
            href,
            color: None,
        })
    }

    fn request_error(&self, method: &str, path: &str, e: impl std::fmt::Debug) -> DavError {
        DavError::Request {
            method: method.to_string(),
            path: path.to_string(),
            message: format!("{:?}", e),
        }
    }
}

impl CalendarStore for DavClient {
    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, DavError> {
        let client = &self.client;
        let principal = client
            .find_current_user_principal()
            .await
            .map_err(|e| self.request_error("PROPFIND", &self.base_path(), e))?
            .ok_or(DavError::NoPrincipal)?;

        let home_set_resp = client
            .request(FindCalendarHomeSet::new(principal.path()))
            .await
            .map_err(|e| self.request_error("PROPFIND", &principal.to_string(), e))?;

        let home_url = home_set_resp.home_sets.first().ok_or(DavError::NoHomeSet)?;

        let cals_resp = client
            .request(FindCalendars::new(home_url.path()))
            .await
            .map_err(|e| self.request_error("PROPFIND", &home_url.to_string(), e))?;

        let mut calendars = Vec::new();
        for col in cals_resp.calendars {
            let name = client
                .request(GetProperty::new(&col.href, &names::DISPLAY_NAME))
                .await
                .ok()
                .and_then(|r| r.value)
                .unwrap_or_else(|| col.href.clone());

            let color = client
                .request(GetProperty::new(&col.href, &APPLE_COLOR))
                .await
                .ok()
                .and_then(|r| r.value);

            calendars.push(CalendarListEntry {
                name,
                href: col.href,
                color,
            });
        }
        log::debug!("Found {} calendars", calendars.len());
        Ok(calendars)
    }

    async fn create_calendar(
        &self,
        name: &str,
        id: &str,
        components: &[&str],
    ) -> Result<CalendarListEntry, DavError> {
        let home = self.calendar_home_set().await?;
        self.create_calendar_in(&home, name, id, components).await
    }

    async fn set_calendar_color(
        &self,
        calendar: &CalendarListEntry,
        color: &str,
    ) -> Result<(), DavError> {
        let path = strip_host(&calendar.href);
        self.send_raw("PROPPATCH", &path, color_proppatch_body(color), XML, None)
            .await?;
        Ok(())
    }

    async fn add_todo(&self, calendar: &CalendarListEntry, todo: &Todo) -> Result<(), DavError> {
        // Plain PUT: a resource left by an earlier run is overwritten, not refused.
        let path = strip_host(&join_href(&calendar.href, &format!("{}.ics", todo.uid)));
        self.send_raw("PUT", &path, todo.to_ics(), ICS, None).await?;
        Ok(())
    }

    async fn todo_by_uid(
        &self,
        calendar: &CalendarListEntry,
        uid: &str,
    ) -> Result<Option<String>, DavError> {
        let path = strip_host(&calendar.href);
        let body = self
            .send_raw("REPORT", &path, uid_query_body(uid), XML, Some("1"))
            .await?;
        Ok(find_uid_href(&parse_multistatus(&body)?, uid))
    }
}
