//! Sorted-set key names for the externally maintained topic indices.
//!
//! Scores in both indices are epoch milliseconds, higher = more recent.

use suggest_types::CategoryId;

/// Topics carrying `tag`, scored by topic timestamp.
/// Format: tag:{tag}:topics
pub fn tag_topics_key(tag: &str) -> String {
    format!("tag:{}:topics", tag)
}

/// Topics in a category, scored by last post time.
/// Format: cid:{cid}:tids:lastposttime
pub fn category_recent_key(cid: CategoryId) -> String {
    format!("cid:{}:tids:lastposttime", cid)
}

/// Union keys for a set of tags.
pub fn tag_keys<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter().map(|t| tag_topics_key(t.as_ref())).collect()
}
