//! Mapping scheduled titles back to caller records

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

use super::key::TitleKey;
use super::schedule::Schedule;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Scheduled task '{0}' has no matching record")]
    MissingRecord(String),

    #[error("More than one record is titled '{0}'")]
    AmbiguousRecord(String),
}

/// A caller record the scheduler's output can be mapped onto
pub trait Schedulable {
    type Id: Clone;

    fn title(&self) -> &str;

    fn id(&self) -> Self::Id;
}

/// Result of projecting onto a record set that may not cover every title
#[derive(Debug, Clone, PartialEq)]
pub struct PartialProjection<Id> {
    /// `(position, id)` for every title with a record
    pub placed: Vec<(usize, Id)>,
    /// Titles with no record, in schedule order
    pub unmatched: Vec<String>,
}

fn index_records<'a, R>(
    records: impl IntoIterator<Item = &'a R>,
) -> Result<HashMap<TitleKey, &'a R>, ProjectionError>
where
    R: Schedulable + 'a,
{
    let mut index = HashMap::new();
    for record in records {
        match index.entry(TitleKey::new(record.title())) {
            Entry::Occupied(_) => {
                return Err(ProjectionError::AmbiguousRecord(record.title().to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }
    Ok(index)
}

/// Maps every scheduled title to its record's ID, in order
///
/// Fails if any title has no record.
pub fn project_order<'a, R>(
    schedule: &Schedule,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<Vec<R::Id>, ProjectionError>
where
    R: Schedulable + 'a,
{
    let index = index_records(records)?;

    schedule
        .order()
        .iter()
        .map(|title| {
            index
                .get(&TitleKey::new(title))
                .map(|record| record.id())
                .ok_or_else(|| ProjectionError::MissingRecord(title.clone()))
        })
        .collect()
}

/// Maps scheduled titles to record IDs, skipping titles with no record
pub fn project_order_partial<'a, R>(
    schedule: &Schedule,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<PartialProjection<R::Id>, ProjectionError>
where
    R: Schedulable + 'a,
{
    let index = index_records(records)?;
    let mut projection = PartialProjection {
        placed: Vec::new(),
        unmatched: Vec::new(),
    };

    for (position, title) in schedule.order().iter().enumerate() {
        match index.get(&TitleKey::new(title)) {
            Some(record) => projection.placed.push((position, record.id())),
            None => projection.unmatched.push(title.clone()),
        }
    }

    Ok(projection)
}
