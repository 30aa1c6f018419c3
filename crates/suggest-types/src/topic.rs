//! Topic identifiers and records exchanged with collaborators.

use serde::{Deserialize, Serialize};

use crate::error::SuggestError;

/// Topic identifier.
pub type TopicId = u64;

/// Category identifier.
pub type CategoryId = u64;

/// User identifier. `0` is the anonymous guest.
pub type UserId = u64;

/// Parse a caller-supplied topic id, tolerating surrounding whitespace.
pub fn parse_topic_id(raw: &str) -> Result<TopicId, SuggestError> {
    raw.trim()
        .parse::<TopicId>()
        .map_err(|e| SuggestError::InvalidInput(format!("invalid topic id {:?}: {}", raw, e)))
}

/// Reference fields the search source needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFields {
    /// Topic title, used verbatim as the search query
    pub title: String,

    /// Category the topic lives in
    pub cid: CategoryId,
}

/// A resolved topic as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic id
    pub tid: TopicId,

    /// Category id
    pub cid: CategoryId,

    /// Author of the topic
    pub uid: UserId,

    /// Topic title
    pub title: String,

    /// Last activity, epoch milliseconds
    pub timestamp: i64,
}

impl TopicSummary {
    /// Last activity as a UTC datetime, if representable.
    pub fn last_activity(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}
