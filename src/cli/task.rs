//! Task CLI commands

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{parse_due_date, schedule, ScheduleError, Task, TaskId, TaskInput, TitleKey};
use crate::storage::{find_task, Project, TaskStore};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   minipm task add "Write docs"
    ///   minipm task add "Ship" --due 2024-03-01 --hours 2 --after "Write docs"
    Add {
        /// Task title (unique, case-insensitive)
        title: String,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Estimated effort in hours
        #[arg(long)]
        hours: Option<u32>,

        /// Task that must come first (ID or title, repeatable)
        #[arg(long)]
        after: Vec<String>,
    },

    /// List tasks in their saved order
    List,

    /// Show task details
    Show {
        /// Task ID or title
        task: String,
    },

    /// Rename a task or change its due date or estimate
    Set {
        /// Task ID or title
        task: String,

        /// New title (unique, case-insensitive)
        #[arg(long)]
        title: Option<String>,

        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// New effort estimate in hours
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Mark task as in progress
    Start {
        /// Task ID or title
        task: String,
    },

    /// Mark task as done
    Done {
        /// Task ID or title
        task: String,
    },

    /// Remove a task
    Rm {
        /// Task ID or title
        task: String,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that will wait
        task: String,

        /// Task that must come first
        depends_on: String,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: String,

        /// Dependency to remove
        depends_on: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            due,
            hours,
            after,
        } => add_task(output, &title, due.as_deref(), hours, &after),
        TaskCommands::List => list_tasks(output),
        TaskCommands::Show { task } => show_task(output, &task),
        TaskCommands::Set {
            task,
            title,
            due,
            clear_due,
            hours,
        } => set_task(
            output,
            &task,
            SetFields {
                title: title.as_deref(),
                due: due.as_deref(),
                clear_due,
                hours,
            },
        ),
        TaskCommands::Start { task } => start_task(output, &task),
        TaskCommands::Done { task } => complete_task(output, &task),
        TaskCommands::Rm { task } => remove_task(output, &task),
        TaskCommands::Dep { task, depends_on } => add_dependency(output, &task, &depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dependency(output, &task, &depends_on),
    }
}

fn lookup<'a>(tasks: &'a HashMap<TaskId, Task>, id_or_title: &str) -> Result<&'a Task> {
    match find_task(tasks, id_or_title) {
        Some(task) => Ok(task),
        None => bail!("Task not found: {}", id_or_title),
    }
}

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 100;

/// Checks a title for a stored task and returns it trimmed
///
/// `renaming` is the task being renamed, which may keep its own title.
fn check_title<'a>(
    tasks: &HashMap<TaskId, Task>,
    title: &'a str,
    renaming: Option<&TaskId>,
) -> Result<&'a str> {
    let title = title.trim();
    let key = TitleKey::new(title);

    if key.is_empty() {
        bail!("Task title cannot be empty");
    }
    let chars = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&chars) {
        bail!(
            "Task title must be {} to {} characters long",
            TITLE_MIN_CHARS,
            TITLE_MAX_CHARS
        );
    }
    if TaskId::is_id_like(title) {
        bail!("Task title '{}' looks like a task ID", title);
    }
    if tasks
        .values()
        .any(|t| Some(&t.id) != renaming && TitleKey::new(&t.title) == key)
    {
        bail!("A task titled '{}' already exists", title);
    }

    Ok(title)
}

fn add_task(
    output: &Output,
    title: &str,
    due: Option<&str>,
    hours: Option<u32>,
    after: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;

    let title = check_title(&tasks, title, None)?;

    let mut task = Task::new(TaskId::new(title, Utc::now()), title);
    task.due_date = due.map(parse_due_date).transpose()?;
    task.estimated_hours = hours.unwrap_or(0);
    task.sort_order = store.next_sort_order()?;

    for dep in after {
        let dep_task = lookup(&tasks, dep)?;
        task.add_dependency(dep_task.id.clone());
    }

    output.verbose_ctx(
        "task",
        &format!("Adding {} at position {}", task.id, task.sort_order),
    );
    store.append(&task)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
        }));
    } else {
        output.success(&format!("Created task {}: {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_ordered()?;

    if output.is_json() {
        output.data(&tasks);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    println!(
        "{:<4} {:<10} {:<12} {:<11} {:>5}  TITLE",
        "#", "ID", "STATUS", "DUE", "HOURS"
    );
    println!("{}", "-".repeat(72));
    for task in &tasks {
        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<10} {:<12} {:<11} {:>5}  {}",
            task.sort_order + 1,
            task.id,
            task.status.label(),
            due,
            task.estimated_hours,
            task.title
        );
    }

    Ok(())
}

fn show_task(output: &Output, id_or_title: &str) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;
    let task = lookup(&tasks, id_or_title)?;

    if output.is_json() {
        output.data(task);
        return Ok(());
    }

    println!("{}: {}", task.id, task.title);
    println!("Status:   {}", task.status.label());
    println!("Position: {}", task.sort_order + 1);
    println!("Hours:    {}", task.estimated_hours);
    if let Some(due) = task.due_date {
        println!("Due:      {}", due.to_rfc3339());
    }
    if !task.depends_on.is_empty() {
        println!("After:");
        for dep in &task.depends_on {
            let title = tasks.get(dep).map(|t| t.title.as_str()).unwrap_or("(missing)");
            println!("  {} {}", dep, title);
        }
    }

    Ok(())
}

/// Field edits for `task set`
struct SetFields<'a> {
    title: Option<&'a str>,
    due: Option<&'a str>,
    clear_due: bool,
    hours: Option<u32>,
}

fn set_task(output: &Output, id_or_title: &str, fields: SetFields<'_>) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;
    let mut task = lookup(&tasks, id_or_title)?.clone();

    if let Some(title) = fields.title {
        let title = check_title(&tasks, title, Some(&task.id))?;
        output.verbose_ctx("task", &format!("Renaming {} to '{}'", task.id, title));
        task.title = title.to_string();
    }
    if let Some(due) = fields.due {
        task.due_date = Some(parse_due_date(due)?);
    } else if fields.clear_due {
        task.due_date = None;
    }
    if let Some(hours) = fields.hours {
        task.estimated_hours = hours;
    }
    task.updated_at = Utc::now();

    store.update(&task)?;
    output.success(&format!("Updated task {}", task.id));
    Ok(())
}

fn start_task(output: &Output, id_or_title: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;
    let mut task = lookup(&tasks, id_or_title)?.clone();

    task.start();
    store.update(&task)?;

    output.success(&format!("Started task {}", task.id));
    Ok(())
}

fn complete_task(output: &Output, id_or_title: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;
    let mut task = lookup(&tasks, id_or_title)?.clone();

    task.complete();
    store.update(&task)?;

    output.success(&format!("Completed task {}", task.id));
    Ok(())
}

fn remove_task(output: &Output, id_or_title: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;
    let task = lookup(&tasks, id_or_title)?;

    store.remove(&task.id)?;
    output.success(&format!("Removed task {}", task.id));
    Ok(())
}

fn add_dependency(output: &Output, task_ref: &str, depends_on_ref: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;

    let mut task = lookup(&tasks, task_ref)?.clone();
    let dep = lookup(&tasks, depends_on_ref)?;

    if !task.add_dependency(dep.id.clone()) {
        output.success(&format!("{} already depends on {}", task.id, dep.id));
        return Ok(());
    }

    ensure_schedulable(&store, &task)?;
    store.update(&task)?;

    output.success(&format!("{} now depends on {}", task.id, dep.id));
    Ok(())
}

fn remove_dependency(output: &Output, task_ref: &str, depends_on_ref: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let tasks = store.read_all()?;

    let mut task = lookup(&tasks, task_ref)?.clone();
    let dep = lookup(&tasks, depends_on_ref)?;

    if task.remove_dependency(&dep.id) {
        store.update(&task)?;
        output.success(&format!("Removed dependency: {} no longer depends on {}", task.id, dep.id));
    } else {
        output.success(&format!("{} does not depend on {}", task.id, dep.id));
    }

    Ok(())
}

/// Refuses an edit that would leave the stored tasks impossible to order
fn ensure_schedulable(store: &TaskStore, changed: &Task) -> Result<()> {
    let mut tasks = store.read_all()?;
    tasks.insert(changed.id.clone(), changed.clone());

    let titles: HashMap<TaskId, String> = tasks
        .iter()
        .map(|(id, t)| (id.clone(), t.title.clone()))
        .collect();
    let inputs: Vec<TaskInput> = tasks.values().map(|t| t.to_input(&titles)).collect();

    match schedule(&inputs) {
        Ok(_) => Ok(()),
        Err(e @ ScheduleError::InfeasibleDependencies { .. }) => {
            bail!("Adding this dependency would create a cycle: {}", e)
        }
        Err(e) => Err(e).context("Stored tasks cannot be scheduled"),
    }
}
