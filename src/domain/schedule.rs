//! Priority-aware topological scheduling
//!
//! Orders tasks with Kahn's algorithm, picking among ready tasks by:
//!
//! 1. earliest due date (tasks without one come last)
//! 2. fewest estimated hours
//! 3. earliest position in the input
//!
//! The third key makes the comparator total, so the same input always
//! yields the same order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::graph::DependencyGraph;
use super::input::TaskInput;
use super::key::TitleKey;
use super::task::Task;
use super::validate::validate;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Task at index {index} has an empty title")]
    EmptyTitle { index: usize },

    #[error("Task titles must be unique: '{title}' appears more than once")]
    DuplicateTitle { title: String },

    #[error("Unknown dependency '{dependency}' for task '{task}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("{}", describe_infeasible(.unresolved, .cycle))]
    InfeasibleDependencies {
        /// Every task that could not be ordered, in input order
        unresolved: Vec<String>,
        /// Members of one dependency cycle, in input order
        cycle: Vec<String>,
    },
}

impl ScheduleError {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::EmptyTitle { .. } => "empty_title",
            ScheduleError::DuplicateTitle { .. } => "duplicate_title",
            ScheduleError::UnknownDependency { .. } => "unknown_dependency",
            ScheduleError::InfeasibleDependencies { .. } => "infeasible_dependencies",
        }
    }
}

fn describe_infeasible(unresolved: &[String], cycle: &[String]) -> String {
    let mut message = format!(
        "Cyclic or unresolved dependencies detected: {} task(s) cannot be ordered ({})",
        unresolved.len(),
        unresolved.join(", ")
    );
    if !cycle.is_empty() {
        message.push_str(&format!("; cycle: {}", cycle.join(" -> ")));
    }
    message
}

/// A feasible execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    order: Vec<String>,
}

impl Schedule {
    /// Task titles, as supplied, in execution order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn into_order(self) -> Vec<String> {
        self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the position of a task, matching titles case-insensitively
    pub fn position(&self, title: &str) -> Option<usize> {
        let key = TitleKey::new(title);
        self.order.iter().position(|t| TitleKey::new(t) == key)
    }
}

/// Heap key for a ready task; field order is comparison order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ReadyKey {
    undated: bool,
    due: Option<DateTime<Utc>>,
    hours: u32,
    index: usize,
}

impl ReadyKey {
    fn of(tasks: &[TaskInput], index: usize) -> Self {
        let task = &tasks[index];
        Self {
            undated: task.due_date.is_none(),
            due: task.due_date,
            hours: task.estimated_hours,
            index,
        }
    }
}

/// Computes the execution order for a set of tasks
///
/// Validation runs first and short-circuits before any graph is built.
/// Never returns a partial order: if some task cannot be reached the
/// whole run fails with [`ScheduleError::InfeasibleDependencies`].
pub fn schedule(tasks: &[TaskInput]) -> Result<Schedule, ScheduleError> {
    let validated = validate(tasks)?;
    let graph = DependencyGraph::build(&validated);
    order(tasks, &graph)
}

fn order(tasks: &[TaskInput], graph: &DependencyGraph) -> Result<Schedule, ScheduleError> {
    let mut in_degree = graph.in_degrees();

    let mut ready: BinaryHeap<Reverse<ReadyKey>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(ReadyKey::of(tasks, index)))
        .collect();

    let mut emitted = Vec::with_capacity(tasks.len());

    while let Some(Reverse(next)) = ready.pop() {
        emitted.push(next.index);

        for dependent in graph.dependents(next.index) {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(ReadyKey::of(tasks, dependent)));
            }
        }
    }

    if emitted.len() != tasks.len() {
        let mut placed = vec![false; tasks.len()];
        for &index in &emitted {
            placed[index] = true;
        }

        let unresolved = tasks
            .iter()
            .zip(&placed)
            .filter(|(_, placed)| !**placed)
            .map(|(task, _)| task.title.clone())
            .collect();

        let cycle = graph
            .find_cycle()
            .unwrap_or_default()
            .into_iter()
            .map(|index| tasks[index].title.clone())
            .collect();

        return Err(ScheduleError::InfeasibleDependencies { unresolved, cycle });
    }

    Ok(Schedule {
        order: emitted
            .into_iter()
            .map(|index| tasks[index].title.clone())
            .collect(),
    })
}

/// Orders stored tasks by deadline alone, ignoring dependencies
///
/// Due date first (tasks without one come last), then creation time,
/// then ID.
pub fn order_by_deadline<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    let mut ordered: Vec<&Task> = tasks.into_iter().collect();
    ordered.sort_by(|a, b| {
        (a.due_date.is_none(), a.due_date, a.created_at)
            .cmp(&(b.due_date.is_none(), b.due_date, b.created_at))
            .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
    });
    ordered
}
