//! Schedule command
//!
//! Feeds stored (or explicitly supplied) tasks to the scheduler, maps the
//! resulting order back onto stored tasks and persists it as `sort_order`
//! in one atomic store rewrite.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{
    order_by_deadline, project_order, project_order_partial, ScheduleRequest, Task, TaskId,
    TaskInput, TitleKey,
};
use crate::storage::{Project, TaskStore};

#[derive(Serialize)]
struct ScheduleReport<'a> {
    order: &'a [String],
    /// Stored task ID per position, `None` where an input task has no record
    ids: Vec<Option<String>>,
    persisted: bool,
    changed: usize,
}

/// Computes the dependency-aware order and persists it
pub fn run(output: &Output, input: Option<&Path>, dry_run: bool) -> Result<()> {
    let project = Project::open_current()?;
    let settings = &project.config().project.schedule;
    let store = project.task_store();
    let persist = !dry_run && settings.persist_order;

    let stored = store.read_ordered()?;
    output.verbose_ctx("schedule", &format!("Loaded {} stored task(s)", stored.len()));

    let explicit = match input {
        Some(path) => read_request(path)?,
        None => None,
    };
    let from_store = explicit.is_none();

    let inputs = match explicit {
        Some(tasks) => tasks,
        None => stored_inputs(&stored, settings.include_completed),
    };
    output.verbose_ctx(
        "schedule",
        &format!(
            "Scheduling {} task(s) from {}",
            inputs.len(),
            if from_store { "the task store" } else { "the input file" }
        ),
    );

    let schedule = match crate::domain::schedule(&inputs) {
        Ok(schedule) => schedule,
        Err(e) => {
            output.failure(e.code(), &e.to_string());
            return Err(e.into());
        }
    };

    let positions: Vec<(usize, TaskId)> = if from_store {
        project_order(&schedule, &stored)?
            .into_iter()
            .enumerate()
            .collect()
    } else {
        let projection = project_order_partial(&schedule, &stored)?;
        if !projection.unmatched.is_empty() {
            output.verbose_ctx(
                "schedule",
                &format!(
                    "No stored task for: {}",
                    projection.unmatched.join(", ")
                ),
            );
        }
        projection.placed
    };

    let changed = persist_positions(output, &store, &positions, persist)?;

    let mut ids = vec![None; schedule.len()];
    for (position, id) in &positions {
        ids[*position] = Some(id.to_string());
    }

    report(
        output,
        &ScheduleReport {
            order: schedule.order(),
            ids,
            persisted: persist,
            changed,
        },
    );

    Ok(())
}

/// Orders stored tasks by deadline only and persists the order
pub fn by_deadline(output: &Output, dry_run: bool) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let persist = !dry_run && project.config().project.schedule.persist_order;

    let stored = store.read_all()?;
    let ordered = order_by_deadline(stored.values());
    output.verbose_ctx("schedule", &format!("Ordering {} task(s) by deadline", ordered.len()));

    let positions: Vec<(usize, TaskId)> = ordered
        .iter()
        .enumerate()
        .map(|(position, task)| (position, task.id.clone()))
        .collect();
    let titles: Vec<String> = ordered.iter().map(|t| t.title.clone()).collect();

    let changed = persist_positions(output, &store, &positions, persist)?;

    report(
        output,
        &ScheduleReport {
            order: &titles,
            ids: positions.iter().map(|(_, id)| Some(id.to_string())).collect(),
            persisted: persist,
            changed,
        },
    );

    Ok(())
}

fn read_request(path: &Path) -> Result<Option<Vec<TaskInput>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule input: {}", path.display()))?;

    let request: ScheduleRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schedule input: {}", path.display()))?;

    Ok(request.into_tasks())
}

/// Builds scheduler input from stored tasks, in their current display order
///
/// When completed tasks are left out, dependencies on them count as
/// satisfied and are dropped.
fn stored_inputs(tasks: &[Task], include_completed: bool) -> Vec<TaskInput> {
    let titles: HashMap<TaskId, String> = tasks
        .iter()
        .map(|t| (t.id.clone(), t.title.clone()))
        .collect();

    let done: HashSet<TitleKey> = if include_completed {
        HashSet::new()
    } else {
        tasks
            .iter()
            .filter(|t| t.status.is_complete())
            .map(|t| TitleKey::new(&t.title))
            .collect()
    };

    tasks
        .iter()
        .filter(|t| include_completed || !t.status.is_complete())
        .map(|t| {
            let mut input = t.to_input(&titles);
            input
                .dependencies
                .retain(|dep| !done.contains(&TitleKey::new(dep)));
            input
        })
        .collect()
}

fn persist_positions(
    output: &Output,
    store: &TaskStore,
    positions: &[(usize, TaskId)],
    persist: bool,
) -> Result<usize> {
    if !persist {
        output.verbose_ctx("schedule", "Not persisting order");
        return Ok(0);
    }

    let changed = store.apply_order(positions)?;
    output.verbose_ctx(
        "schedule",
        &format!("Persisted order, {} task(s) moved", changed),
    );
    Ok(changed)
}

fn report(output: &Output, report: &ScheduleReport<'_>) {
    if output.is_json() {
        output.data(report);
        return;
    }

    if report.order.is_empty() {
        println!("No tasks to schedule.");
        return;
    }

    println!("Recommended order ({} tasks):", report.order.len());
    println!("{:<4} {:<10} TITLE", "#", "ID");
    println!("{}", "-".repeat(60));
    for (position, title) in report.order.iter().enumerate() {
        let id = report.ids[position].as_deref().unwrap_or("-");
        println!("{:<4} {:<10} {}", position + 1, id, title);
    }

    println!();
    if report.persisted {
        println!("Saved order ({} task(s) moved).", report.changed);
    } else {
        println!("Order not saved.");
    }
}
