//! Input validation for scheduling runs
//!
//! Runs entirely before graph construction. Titles are checked over the
//! whole input first, then dependencies, so a duplicate title is always
//! reported ahead of an unknown dependency.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::input::TaskInput;
use super::key::TitleKey;
use super::schedule::ScheduleError;

/// Input that passed validation, with every dependency resolved to an index
#[derive(Debug)]
pub struct ValidatedTasks<'a> {
    tasks: &'a [TaskInput],
    keys: HashMap<TitleKey, usize>,
    dependencies: Vec<Vec<usize>>,
}

impl<'a> ValidatedTasks<'a> {
    pub fn tasks(&self) -> &'a [TaskInput] {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolves a title to its input index
    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.keys.get(&TitleKey::new(title)).copied()
    }

    /// Input indices of the tasks that must precede `index`, one per listed dependency
    pub fn dependencies(&self, index: usize) -> &[usize] {
        self.dependencies
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Validates a scheduling input
pub fn validate(tasks: &[TaskInput]) -> Result<ValidatedTasks<'_>, ScheduleError> {
    let mut keys = HashMap::with_capacity(tasks.len());

    for (index, task) in tasks.iter().enumerate() {
        let key = TitleKey::new(&task.title);
        if key.is_empty() {
            return Err(ScheduleError::EmptyTitle { index });
        }

        match keys.entry(key) {
            Entry::Occupied(_) => {
                return Err(ScheduleError::DuplicateTitle {
                    title: task.title.clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    let mut dependencies = Vec::with_capacity(tasks.len());
    for task in tasks {
        let resolved = task
            .dependencies
            .iter()
            .map(|dep| {
                keys.get(&TitleKey::new(dep))
                    .copied()
                    .ok_or_else(|| ScheduleError::UnknownDependency {
                        task: task.title.clone(),
                        dependency: dep.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        dependencies.push(resolved);
    }

    Ok(ValidatedTasks {
        tasks,
        keys,
        dependencies,
    })
}
