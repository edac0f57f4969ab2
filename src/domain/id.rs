//! Task IDs
//!
//! Format: `t-{7-char-hash}` (e.g., `t-9d3e5f2`).
//!
//! Hash is derived from title + creation timestamp, so the same title
//! created twice gets two different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{7-char-hash}}', got '{0}'")]
    InvalidTaskId(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Stored task ID in the format `t-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
}

impl TaskId {
    /// Creates a new task ID from title and timestamp
    pub fn new(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(title, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns true if `s` looks like a task ID rather than a title
    pub fn is_id_like(s: &str) -> bool {
        s.parse::<TaskId>().is_ok()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_has_prefix_and_hash() {
        let id = TaskId::new("Write docs", Utc::now());
        let s = id.to_string();

        assert!(s.starts_with("t-"));
        assert_eq!(s.len(), 9);
        assert!(id.hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_title_different_time() {
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::nanoseconds(1);

        assert_ne!(TaskId::new("Same", t1), TaskId::new("Same", t2));
    }

    #[test]
    fn deterministic_for_same_input() {
        let ts = Utc::now();
        assert_eq!(TaskId::new("Same", ts), TaskId::new("Same", ts));
    }

    #[test]
    fn parse_roundtrip() {
        let id = TaskId::new("Parse me", Utc::now());
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_bad_ids() {
        assert!("a-1234567".parse::<TaskId>().is_err());
        assert!("t-123".parse::<TaskId>().is_err());
        assert!("t-zzzzzzz".parse::<TaskId>().is_err());
        assert!("Write docs".parse::<TaskId>().is_err());
    }

    #[test]
    fn id_like_detection() {
        assert!(TaskId::is_id_like("t-abc1234"));
        assert!(!TaskId::is_id_like("Design review"));
    }

    #[test]
    fn serde_as_string() {
        let id: TaskId = "t-abc1234".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"t-abc1234\"");

        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
