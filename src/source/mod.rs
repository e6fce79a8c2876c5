// File: ./src/source/mod.rs
//! Read side of a sync run: the task service and a per-run cache in front of it.
pub mod todoist;

use crate::error::SourceError;
use crate::model::{Comment, Project, SourceTask};
use std::collections::HashMap;

pub use todoist::TodoistApi;

#[allow(async_fn_in_trait)]
pub trait TaskSource {
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError>;
    async fn list_tasks(&self) -> Result<Vec<SourceTask>, SourceError>;
    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, SourceError>;
}

/// Projects and tasks fetched at most once per run.
///
/// Tasks keep source order (stable sort on `order`). Comments are not cached.
pub struct SourceCache<S> {
    source: S,
    projects: Option<HashMap<String, Project>>,
    tasks: Option<Vec<SourceTask>>,
}

impl<S: TaskSource> SourceCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            projects: None,
            tasks: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn load_projects(&mut self) -> Result<&HashMap<String, Project>, SourceError> {
        if self.projects.is_none() {
            let projects = self.source.list_projects().await?;
            log::debug!("Fetched {} projects", projects.len());
            self.projects = Some(projects.into_iter().map(|p| (p.id.clone(), p)).collect());
        }
        let projects: &HashMap<String, Project> = self.projects.get_or_insert_with(HashMap::new);
        Ok(projects)
    }

    pub async fn project(&mut self, id: &str) -> Result<Option<&Project>, SourceError> {
        Ok(self.load_projects().await?.get(id))
    }

    pub async fn tasks(&mut self) -> Result<&[SourceTask], SourceError> {
        if self.tasks.is_none() {
            let mut tasks = self.source.list_tasks().await?;
            tasks.sort_by_key(|t| t.order);
            log::debug!("Fetched {} tasks", tasks.len());
            self.tasks = Some(tasks);
        }
        let tasks: &[SourceTask] = self.tasks.get_or_insert_with(Vec::new);
        Ok(tasks)
    }

    pub async fn comments(&self, task_id: &str) -> Result<Vec<Comment>, SourceError> {
        self.source.list_comments(task_id).await
    }
}
