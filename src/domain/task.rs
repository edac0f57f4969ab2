//! Task domain model
//!
//! Tasks are the stored units of work in a project. Dependencies are
//! kept by ID; the scheduler sees them by title through [`Task::to_input`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::TaskId;
use super::input::TaskInput;
use super::projector::Schedulable;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title, unique within the project (case-insensitive)
    pub title: String,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Deadline, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Effort estimate in hours
    #[serde(default)]
    pub estimated_hours: u32,

    /// Tasks that must be done before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// Display position, rewritten by `schedule`
    #[serde(default)]
    pub sort_order: u32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (if done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            status: TaskStatus::Todo,
            due_date: None,
            estimated_hours: 0,
            depends_on: Vec::new(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Adds a dependency, returning false if it was already present
    pub fn add_dependency(&mut self, depends_on: TaskId) -> bool {
        if self.depends_on.contains(&depends_on) {
            return false;
        }
        self.depends_on.push(depends_on);
        self.updated_at = Utc::now();
        true
    }

    /// Removes a dependency, returning true if it was present
    pub fn remove_dependency(&mut self, depends_on: &TaskId) -> bool {
        let before = self.depends_on.len();
        self.depends_on.retain(|d| d != depends_on);
        let removed = self.depends_on.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Marks the task as in progress
    pub fn start(&mut self) {
        self.status = TaskStatus::InProgress;
        self.completed_at = None;
        self.updated_at = Utc::now();
    }

    /// Marks the task as done
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Builds the scheduler input for this task
    ///
    /// Dependency IDs are resolved to titles through `titles`. An ID with no
    /// entry is passed through verbatim, which the scheduler then reports
    /// as an unknown dependency.
    pub fn to_input(&self, titles: &HashMap<TaskId, String>) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            estimated_hours: self.estimated_hours,
            due_date: self.due_date,
            dependencies: self
                .depends_on
                .iter()
                .map(|dep| {
                    titles
                        .get(dep)
                        .cloned()
                        .unwrap_or_else(|| dep.to_string())
                })
                .collect(),
        }
    }
}

impl Schedulable for Task {
    type Id = TaskId;

    fn title(&self) -> &str {
        &self.title
    }

    fn id(&self) -> TaskId {
        self.id.clone()
    }
}
