//! Scheduler input descriptors
//!
//! A [`TaskInput`] is what a caller hands the scheduler for one run. It
//! references other tasks by title, never by stored ID.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Invalid due date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDueDate(String),
}

/// One task descriptor for a scheduling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,

    /// Effort estimate, 0 when absent
    #[serde(default, alias = "estimated_hours")]
    pub estimated_hours: u32,

    /// Deadline; `None` sorts after every dated task
    #[serde(
        default,
        alias = "due_date",
        deserialize_with = "deserialize_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,

    /// Titles that must be ordered before this task
    #[serde(
        default,
        deserialize_with = "deserialize_dependencies",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dependencies: Vec<String>,
}

impl TaskInput {
    /// Creates an input with no deadline, no estimate and no dependencies
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            estimated_hours: 0,
            due_date: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_hours(mut self, hours: u32) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Adds a dependency on another task by title
    pub fn after(mut self, title: impl Into<String>) -> Self {
        self.dependencies.push(title.into());
        self
    }
}

/// Body of an explicit scheduling request
///
/// Accepts either a bare array of tasks or `{ "tasks": [...] }`. The object
/// form rejects any other key, so a misspelled `tasks` is an error rather
/// than an empty request.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScheduleRequest {
    Tasks(Vec<TaskInput>),
    Wrapped(TaskList),
}

/// Object form of a scheduling request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Option<Vec<TaskInput>>,
}

impl ScheduleRequest {
    /// Returns the supplied tasks, or `None` if the caller supplied none
    pub fn into_tasks(self) -> Option<Vec<TaskInput>> {
        let tasks = match self {
            ScheduleRequest::Tasks(tasks) => Some(tasks),
            ScheduleRequest::Wrapped(list) => list.tasks,
        };
        tasks.filter(|t| !t.is_empty())
    }
}

/// Parses a due date in any of the accepted forms
///
/// Date-only values resolve to midnight UTC; naive timestamps are read as UTC.
pub fn parse_due_date(s: &str) -> Result<DateTime<Utc>, InputError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| InputError::InvalidDueDate(s.to_string()))
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_due_date(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

fn deserialize_dependencies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let deps: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(deps.unwrap_or_default())
}
