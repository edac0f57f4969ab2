//! minipm - local-first project tasks with a dependency-aware scheduler
//!
//! The interesting part lives in [`domain`]: given tasks with optional due
//! dates, effort estimates and dependencies, [`domain::schedule`] returns a
//! deterministic execution order or a precise reason why none exists.
//! [`storage`] and [`cli`] wrap it in a small JSONL-backed command-line tool.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{schedule, Schedule, ScheduleError, Task, TaskId, TaskInput, TaskStatus};
