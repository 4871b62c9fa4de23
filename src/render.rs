//! Projection of the task list into what the UI displays.
//!
//! A render pass is rebuilt from scratch on every call. The `index` carried
//! by each item is only valid until the next mutation.

use crate::task::{Status, Task};
use chrono::NaiveDate;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItemView {
    pub index: usize,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskListView {
    pub items: Vec<TaskItemView>,
    pub summary: Option<String>,
}

impl TaskListView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Replaces control characters with U+FFFD so stored text can never drive
/// the terminal (escape sequences, cursor movement, line breaks).
pub fn display_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(
            text.chars()
                .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(text)
    }
}

/// Formats a date the way the list shows it, e.g. `Jan 5, 2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn render(tasks: &[Task]) -> TaskListView {
    let items = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| TaskItemView {
            index,
            title: display_text(&task.title).into_owned(),
            description: Some(task.description.trim())
                .filter(|d| !d.is_empty())
                .map(|d| display_text(d).into_owned()),
            date: format_date(task.date),
            status: task.status,
        })
        .collect();
    let summary = (!tasks.is_empty()).then(|| format!("Tasks: {}", tasks.len()));

    TaskListView { items, summary }
}
