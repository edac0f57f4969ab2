//! JSONL storage for tasks
//!
//! Tasks are stored in `.minipm/tasks.jsonl` with one JSON object per line.
//! Readers take a shared lock on the data file. Writers hold an exclusive
//! lock on `.minipm/tasks.lock` for the whole read-modify-write, since a
//! rewrite replaces the data file by rename.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use fs2::FileExt;

use crate::domain::{Task, TaskId, TitleKey};

/// Store for task data in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".minipm").join("tasks.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes the store's write lock, held until the returned file is dropped
    pub fn lock(&self) -> Result<File> {
        self.ensure_parent()?;

        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;
        Ok(file)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    /// Reads all tasks from the store
    ///
    /// Later lines win when an ID appears more than once.
    pub fn read_all(&self) -> Result<HashMap<TaskId, Task>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            tasks.insert(task.id.clone(), task);
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Reads all tasks in display order (sort order, then creation time)
    pub fn read_ordered(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_all()?.into_values().collect();
        sort_for_display(&mut tasks);
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    ///
    /// Goes through a temp file and a rename, so readers see either the
    /// old contents or the new ones, never a mix.
    pub fn write_all(&self, tasks: &HashMap<TaskId, Task>) -> Result<()> {
        let _lock = self.lock()?;
        self.rewrite(tasks)
    }

    /// Full rewrite; the caller holds the write lock
    fn rewrite(&self, tasks: &HashMap<TaskId, Task>) -> Result<()> {
        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);

            let mut sorted: Vec<Task> = tasks.values().cloned().collect();
            sort_for_display(&mut sorted);

            for task in &sorted {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single task (used for quick adds without full rewrite)
    pub fn append(&self, task: &Task) -> Result<()> {
        let _lock = self.lock()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Keep readers off the partial line
        file.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(task).context("Failed to serialize task")?;
        writeln!(writer, "{}", line).context("Failed to write task")?;

        writer.flush().context("Failed to flush task store")?;

        Ok(())
    }

    /// Updates a single task (reads all, updates, writes all)
    pub fn update(&self, task: &Task) -> Result<()> {
        let _lock = self.lock()?;
        let mut tasks = self.read_all()?;
        tasks.insert(task.id.clone(), task.clone());
        self.rewrite(&tasks)
    }

    /// Removes a task by ID, dropping it from every other task's dependencies
    pub fn remove(&self, task_id: &TaskId) -> Result<bool> {
        let _lock = self.lock()?;
        let mut tasks = self.read_all()?;
        let removed = tasks.remove(task_id).is_some();
        if removed {
            for task in tasks.values_mut() {
                task.remove_dependency(task_id);
            }
            self.rewrite(&tasks)?;
        }
        Ok(removed)
    }

    /// Returns the next free display position
    pub fn next_sort_order(&self) -> Result<u32> {
        let tasks = self.read_all()?;
        Ok(tasks
            .values()
            .map(|t| t.sort_order + 1)
            .max()
            .unwrap_or(0))
    }

    /// Writes scheduled positions onto stored tasks
    ///
    /// All-or-nothing: every ID must exist, and all positions land in a
    /// single atomic rewrite. Returns how many tasks changed position.
    pub fn apply_order(&self, positions: &[(usize, TaskId)]) -> Result<usize> {
        let _lock = self.lock()?;
        let mut tasks = self.read_all()?;

        if let Some((_, missing)) = positions.iter().find(|(_, id)| !tasks.contains_key(id)) {
            bail!("Cannot persist schedule: task {} is not in the store", missing);
        }

        let now = Utc::now();
        let mut changed = 0;
        for (position, id) in positions {
            let position = u32::try_from(*position)
                .with_context(|| format!("Schedule position {} out of range", position))?;

            if let Some(task) = tasks.get_mut(id) {
                if task.sort_order != position {
                    task.sort_order = position;
                    task.updated_at = now;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.rewrite(&tasks)?;
        }

        Ok(changed)
    }
}

/// Finds a task by ID or by case-insensitive title
pub fn find_task<'a>(tasks: &'a HashMap<TaskId, Task>, id_or_title: &str) -> Option<&'a Task> {
    if let Ok(id) = id_or_title.parse::<TaskId>() {
        if let Some(task) = tasks.get(&id) {
            return Some(task);
        }
    }

    let key = TitleKey::new(id_or_title);
    tasks.values().find(|t| TitleKey::new(&t.title) == key)
}

fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
