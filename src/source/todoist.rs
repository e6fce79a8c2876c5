// File: ./src/source/todoist.rs
// Todoist REST client: projects, tasks and comments, decoded with serde.
use crate::client::middleware::{DefaultHeadersLayer, DefaultHeadersService};
use crate::client::transport::{self, HttpsClient};
use crate::error::SourceError;
use crate::model::{Comment, Project, SourceTask};
use crate::source::TaskSource;

use http::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use http::{Request, Uri};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug)]
pub struct TodoistApi {
    base_url: String,
    http: DefaultHeadersService<HttpsClient>,
}

impl TodoistApi {
    pub fn new(base_url: &str, token: &str, insecure: bool) -> Result<Self, SourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let uri: Uri = base_url.parse().map_err(|e: http::uri::InvalidUri| {
            SourceError::Request {
                url: base_url.clone(),
                message: e.to_string(),
            }
        })?;
        let client = transport::build_https_client(&uri, insecure).map_err(|message| {
            SourceError::Transport {
                url: base_url.clone(),
                message,
            }
        })?;
        let http = DefaultHeadersLayer::new()
            .with(USER_AGENT, &transport::user_agent())
            .with(ACCEPT, "application/json")
            .with(AUTHORIZATION, &format!("Bearer {}", token))
            .layer(client);
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let req = Request::builder()
            .method("GET")
            .uri(url.as_str())
            .body(String::new())
            .map_err(|e| SourceError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let mut http = self.http.clone();
        std::future::poll_fn(|cx| http.poll_ready(cx))
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = http.call(req).await.map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| transport_error(&url, e))?
            .to_bytes();

        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| SourceError::Decode { url, source })
    }
}

fn transport_error(url: &str, e: impl std::fmt::Display) -> SourceError {
    SourceError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

impl TaskSource for TodoistApi {
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        self.get_json("/projects").await
    }

    async fn list_tasks(&self) -> Result<Vec<SourceTask>, SourceError> {
        self.get_json("/tasks").await
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, SourceError> {
        self.get_json(&format!("/comments?task_id={}", task_id)).await
    }
}
