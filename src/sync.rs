// File: ./src/sync.rs
//! One-way push of task service projects and tasks into CalDAV calendars.
//!
//! Runs strictly in order: the registry is built once, then every task (in source
//! order) gets its project calendar ensured, its parent looked up and its VTODO written.
//! A second run writes every task again at `<calendar>/<uid>.ics`, overwriting the
//! earlier copy. Nothing is diffed or deleted.
use crate::client::CalendarStore;
use crate::color_utils::{self, DEFAULT_CALENDAR_COLOR};
use crate::error::SyncError;
use crate::model::{CalendarListEntry, Project, Todo};
use crate::registry::CalendarRegistry;
use crate::source::{SourceCache, TaskSource};
use std::collections::HashSet;

pub const CALENDAR_COMPONENTS: &[&str] = &["VTODO"];
pub const NAME_SEPARATOR: &str = " - ";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub skipped: usize,
    pub calendars_created: usize,
}

pub async fn run<S, D>(cache: &mut SourceCache<S>, store: &D) -> Result<SyncReport, SyncError>
where
    S: TaskSource,
    D: CalendarStore,
{
    let mut registry = CalendarRegistry::load(store).await?;
    let mut report = SyncReport::default();

    let tasks = cache.tasks().await?.to_vec();
    log::info!(
        "Syncing {} tasks into {} existing calendars",
        tasks.len(),
        registry.len()
    );

    for task in &tasks {
        let calendar = ensure_project(cache, store, &mut registry, &task.project_id, &mut report)
            .await?;

        let mut related_to = None;
        if let Some(parent_id) = &task.parent_id {
            if !parent_exists(store, &calendar, parent_id).await {
                log::debug!("parent {} not found, skipping {}", parent_id, task.content);
                report.skipped += 1;
                continue;
            }
            related_to = Some(parent_id.clone());
        }

        let comments = if task.comment_count > 0 {
            cache.comments(&task.id).await?
        } else {
            Vec::new()
        };

        let mut todo = Todo::from_source(task, &comments);
        todo.related_to = related_to;

        log::debug!("Adding {} to {}", todo.uid, calendar.href);
        store.add_todo(&calendar, &todo).await?;
        report.created += 1;
    }

    log::info!(
        "Created {} tasks ({} skipped, {} new calendars)",
        report.created,
        report.skipped,
        report.calendars_created
    );
    Ok(report)
}

/// Calendar for `project_id`, created (named, colored) on first reference.
async fn ensure_project<S, D>(
    cache: &mut SourceCache<S>,
    store: &D,
    registry: &mut CalendarRegistry,
    project_id: &str,
    report: &mut SyncReport,
) -> Result<CalendarListEntry, SyncError>
where
    S: TaskSource,
    D: CalendarStore,
{
    if let Some(calendar) = registry.get(project_id) {
        return Ok(calendar.clone());
    }

    let project = cache
        .project(project_id)
        .await?
        .cloned()
        .ok_or_else(|| SyncError::ProjectNotFound(project_id.to_string()))?;
    log::debug!("Ensure project {} exists", project.name);

    let color = color_utils::name_to_hex(&project.color).unwrap_or_else(|e| {
        log::error!("{} {}", project.name, e);
        DEFAULT_CALENDAR_COLOR.to_string()
    });
    let name = calendar_name(cache, &project).await?;

    let created = store
        .create_calendar(&name, &project.id, CALENDAR_COMPONENTS)
        .await?;
    store.set_calendar_color(&created, &color).await?;
    report.calendars_created += 1;

    registry.refresh(store).await?;
    registry
        .get(project_id)
        .cloned()
        .ok_or_else(|| SyncError::CalendarMissing(project_id.to_string()))
}

/// `"<root> - ... - <parent> - <name>"` following the project's ancestors.
pub async fn calendar_name<S: TaskSource>(
    cache: &mut SourceCache<S>,
    project: &Project,
) -> Result<String, SyncError> {
    let mut parts = vec![project.name.clone()];
    let mut seen = HashSet::from([project.id.clone()]);
    let mut parent_id = project.parent_id.clone();

    while let Some(id) = parent_id {
        if !seen.insert(id.clone()) {
            log::error!("Project {} has a cyclic parent chain at {}", project.name, id);
            break;
        }
        let parent = cache
            .project(&id)
            .await?
            .ok_or_else(|| SyncError::ProjectNotFound(id.clone()))?;
        parts.push(parent.name.clone());
        parent_id = parent.parent_id.clone();
    }

    parts.reverse();
    Ok(parts.join(NAME_SEPARATOR))
}

/// Probe failures count as "not there".
async fn parent_exists<D: CalendarStore>(
    store: &D,
    calendar: &CalendarListEntry,
    parent_id: &str,
) -> bool {
    match store.todo_by_uid(calendar, parent_id).await {
        Ok(found) => found.is_some(),
        Err(e) => {
            log::debug!("{}", e);
            false
        }
    }
}

