// File: src/model/adapter.rs
use crate::model::convert::{convert_priority, due_date_from};
use crate::model::item::{Comment, SourceTask, Todo};
use crate::model::recurrence::{self, convert_recurring};
use chrono::Utc;
use icalendar::{Calendar, Component, Todo as IcalTodo};

impl Todo {
    /// Builds the VTODO body for a source task.
    ///
    /// `related_to` is left empty: whether the parent exists on the server is only
    /// known to the caller.
    pub fn from_source(task: &SourceTask, comments: &[Comment]) -> Self {
        let mut todo = Todo::new(&task.id, &task.content);
        todo.sort_order = task.order;
        todo.priority = convert_priority(Some(task.priority));

        let mut description = Vec::new();
        if !task.description.is_empty() {
            description.push(task.description.as_str());
        }
        if task.comment_count > 0 {
            description.extend(comments.iter().map(|c| c.content.as_str()));
        }
        todo.description = description.join("\n");

        if let Some(due) = due_date_from(task) {
            log::debug!("{:?}", task.due);
            todo.due = Some(due);
            if task.due.as_ref().is_some_and(|d| d.is_recurring) {
                todo.rrule = convert_recurring(task);
                // Written as translated even when rrule cannot expand it.
                if let Some(rule) = &todo.rrule
                    && let Err(e) = recurrence::validate(rule, &due)
                {
                    log::debug!("For {}, {} does not expand: {}", task.content, rule, e);
                }
            }
        }

        if !task.labels.is_empty() {
            todo.categories = task.labels.clone();
        }

        todo
    }

    pub fn to_ics(&self) -> String {
        let mut todo = IcalTodo::new();
        todo.uid(&self.uid);
        todo.summary(&self.summary);
        if !self.description.is_empty() {
            todo.description(&self.description);
        }
        todo.timestamp(Utc::now());

        if let Some(priority) = self.priority {
            todo.priority(priority.into());
        }
        todo.add_property("X-APPLE-SORT-ORDER", self.sort_order.to_string());

        if let Some(due) = &self.due {
            todo.add_property("DUE", due.to_ical());
        }
        if let Some(rule) = &self.rrule {
            todo.add_property("RRULE", rule.to_string());
        }
        if let Some(parent) = &self.related_to {
            let prop = icalendar::Property::new("RELATED-TO", parent.as_str());
            todo.append_multi_property(prop);
        }

        let mut calendar = Calendar::new();
        calendar.push(todo);
        let mut ics = calendar.to_string();

        // CATEGORIES is written by hand: the builder would escape the separating commas.
        if !self.categories.is_empty() {
            let escaped_cats: Vec<String> = self
                .categories
                .iter()
                .map(|c| c.replace(',', "\\,"))
                .collect();
            let cat_line = format!("CATEGORIES:{}", escaped_cats.join(","));

            if let Some(idx) = ics.rfind("END:VTODO") {
                let (start, end) = ics.split_at(idx);
                let mut buffer = String::with_capacity(ics.len() + cat_line.len() + 2);
                buffer.push_str(start);
                buffer.push_str(&cat_line);
                buffer.push_str("\r\n");
                buffer.push_str(end);
                ics = buffer;
            }
        }

        ics
    }
}
