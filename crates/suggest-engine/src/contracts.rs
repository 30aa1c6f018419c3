//! Collaborator contracts consumed by the aggregator.
//!
//! The topic store, sorted-set indices, search engine, privilege rules and
//! block lists all live outside this crate. Each is reached through one of
//! the traits below and injected at construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use suggest_types::{CategoryId, SuggestError, TopicFields, TopicId, TopicSummary, UserId};

/// Read access to topic records.
#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Tags attached to a topic. Unknown topics have no tags.
    async fn get_topic_tags(&self, tid: TopicId) -> Result<Vec<String>, SuggestError>;

    /// Title and category of a topic, `None` if it does not exist.
    async fn get_topic_fields(&self, tid: TopicId) -> Result<Option<TopicFields>, SuggestError>;

    /// Category of a topic, `None` if it does not exist.
    async fn get_topic_category(&self, tid: TopicId) -> Result<Option<CategoryId>, SuggestError>;

    /// Resolve topics for a viewer.
    ///
    /// The result is positional: one entry per requested id, `None` where the
    /// id no longer resolves to a live topic.
    async fn get_topics_by_tids(
        &self,
        tids: &[TopicId],
        uid: UserId,
    ) -> Result<Vec<Option<TopicSummary>>, SuggestError>;
}

/// Ordered-range queries over score-sorted indices.
///
/// Multi-key queries operate on the union of the named sets.
#[async_trait]
pub trait SortedSetStore: Send + Sync {
    /// Members by descending score, index range `start..=stop`
    /// (`stop == None` for the full range).
    async fn get_sorted_set_rev_range(
        &self,
        keys: &[String],
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<TopicId>, SuggestError>;

    /// Members by descending score with `score >= min_score`, skipping
    /// `start` and returning at most `count` (`None` for all).
    async fn get_sorted_set_rev_range_by_score(
        &self,
        keys: &[String],
        start: usize,
        count: Option<usize>,
        min_score: i64,
    ) -> Result<Vec<TopicId>, SuggestError>;
}

/// Which fields a search query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIn {
    /// Topic titles only
    Titles,
    /// Post bodies only
    Posts,
    /// Titles and post bodies
    TitlesPosts,
}

/// How query terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchWords {
    /// Every term must match
    All,
    /// Any single term is enough
    Any,
}

/// Direction of the time window relative to its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    /// Active since the window start
    Newer,
    /// Last active before the window start
    Older,
}

/// A full-text search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub query: String,

    /// Field restriction
    pub search_in: SearchIn,

    /// Term combination policy
    pub match_words: MatchWords,

    /// Category filter, empty for all categories
    pub categories: Vec<CategoryId>,

    /// Requesting viewer, for viewer-scoped visibility
    pub uid: UserId,

    /// Return identifiers only
    pub return_ids: bool,

    /// Window length in seconds, `None` for no time restriction
    pub time_range_secs: Option<u64>,

    /// Window direction
    pub time_filter: TimeFilter,
}

/// Identifiers matched by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching topic ids
    pub tids: Vec<TopicId>,
}

/// Full-text search over topics.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a search.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SuggestError>;
}

/// Privileges a topic filter can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    /// May read the topic
    #[serde(rename = "topics:read")]
    TopicsRead,
}

impl Privilege {
    /// Wire name of the privilege.
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::TopicsRead => "topics:read",
        }
    }
}

/// Read-privilege evaluation.
#[async_trait]
pub trait PrivilegeFilter: Send + Sync {
    /// Keep only the ids `uid` holds `privilege` on.
    async fn filter_tids(
        &self,
        privilege: Privilege,
        tids: Vec<TopicId>,
        uid: UserId,
    ) -> Result<Vec<TopicId>, SuggestError>;
}

/// User block lists.
#[async_trait]
pub trait BlockFilter: Send + Sync {
    /// Drop topics authored by users `uid` has blocked.
    async fn filter_blocked(
        &self,
        uid: UserId,
        topics: Vec<TopicSummary>,
    ) -> Result<Vec<TopicSummary>, SuggestError>;
}
