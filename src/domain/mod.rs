//! Domain models and the task scheduler
//!
//! Contains the core business logic without any I/O concerns.

mod graph;
mod id;
mod input;
mod key;
mod projector;
mod schedule;
mod task;
mod validate;

pub use graph::DependencyGraph;
pub use id::{IdError, TaskId};
pub use input::{parse_due_date, InputError, ScheduleRequest, TaskInput, TaskList};
pub use key::TitleKey;
pub use projector::{
    project_order, project_order_partial, PartialProjection, ProjectionError, Schedulable,
};
pub use schedule::{order_by_deadline, schedule, Schedule, ScheduleError};
pub use task::{Task, TaskStatus};
pub use validate::{validate, ValidatedTasks};
