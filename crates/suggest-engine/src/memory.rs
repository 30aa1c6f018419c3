//! In-memory collaborators backed by a JSON fixture.
//!
//! [`InMemoryForum`] implements every collaborator contract over a
//! [`ForumFixture`], so the aggregator can run without a database, search
//! cluster or privilege service. It powers the CLI and the scenario tests.
//!
//! Deleted topics stay in the tag and category indices but resolve to
//! `None`, the same way a stale index entry looks in production.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use suggest_types::{CategoryId, SuggestError, TopicFields, TopicId, TopicSummary, UserId};

use crate::clock::{Clock, SystemClock};
use crate::contracts::{
    BlockFilter, MatchWords, Privilege, PrivilegeFilter, SearchQuery, SearchResponse,
    SearchService, SortedSetStore, TimeFilter, TopicStore,
};
use crate::keys;

/// A topic as described in a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureTopic {
    /// Topic id
    pub tid: TopicId,
    /// Category id
    pub cid: CategoryId,
    /// Author
    pub uid: UserId,
    /// Title
    pub title: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Last activity, epoch milliseconds
    pub timestamp: i64,
    /// Soft-deleted topics remain indexed but do not resolve
    #[serde(default)]
    pub deleted: bool,
}

impl FixtureTopic {
    fn summary(&self) -> TopicSummary {
        TopicSummary {
            tid: self.tid,
            cid: self.cid,
            uid: self.uid,
            title: self.title.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// A forum snapshot: topics, per-viewer category denials and block lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForumFixture {
    /// All topics
    #[serde(default)]
    pub topics: Vec<FixtureTopic>,

    /// Categories each viewer may not read
    #[serde(default)]
    pub denied_categories: HashMap<UserId, Vec<CategoryId>>,

    /// Authors each viewer has blocked
    #[serde(default)]
    pub blocks: HashMap<UserId, Vec<UserId>>,

    /// Frozen "now" for reproducible cutoffs; system time when unset
    #[serde(default)]
    pub now_ms: Option<i64>,
}

impl ForumFixture {
    /// Parse a fixture from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, SuggestError> {
        let fixture: ForumFixture = serde_json::from_str(json)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self, SuggestError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SuggestError::Fixture(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), SuggestError> {
        let mut seen = HashSet::new();
        for topic in &self.topics {
            if !seen.insert(topic.tid) {
                return Err(SuggestError::Fixture(format!(
                    "duplicate topic id {}",
                    topic.tid
                )));
            }
        }
        Ok(())
    }
}

/// Collaborators that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    /// [`TopicStore`]
    Topics,
    /// [`SortedSetStore`]
    SortedSets,
    /// [`SearchService`]
    Search,
    /// [`PrivilegeFilter`]
    Privileges,
    /// [`BlockFilter`]
    Blocks,
}

impl Collaborator {
    fn index(&self) -> usize {
        match self {
            Collaborator::Topics => 0,
            Collaborator::SortedSets => 1,
            Collaborator::Search => 2,
            Collaborator::Privileges => 3,
            Collaborator::Blocks => 4,
        }
    }

    fn unavailable(&self) -> SuggestError {
        match self {
            Collaborator::Topics | Collaborator::SortedSets => {
                SuggestError::Store("store unavailable".to_string())
            }
            Collaborator::Search => SuggestError::Search("search unavailable".to_string()),
            Collaborator::Privileges => {
                SuggestError::Privilege("privilege service unavailable".to_string())
            }
            Collaborator::Blocks => SuggestError::BlockList("block list unavailable".to_string()),
        }
    }
}

/// Fixture-backed implementation of every collaborator contract.
pub struct InMemoryForum {
    topics: HashMap<TopicId, FixtureTopic>,
    sorted_sets: HashMap<String, Vec<(TopicId, i64)>>,
    denied_categories: HashMap<UserId, HashSet<CategoryId>>,
    blocks: HashMap<UserId, HashSet<UserId>>,
    clock: Arc<dyn Clock>,
    failing: HashSet<Collaborator>,
    calls: [AtomicUsize; 5],
    queried_keys: Mutex<Vec<String>>,
}

impl InMemoryForum {
    /// Build the forum and its indices from a fixture.
    pub fn new(fixture: ForumFixture) -> Self {
        let mut sorted_sets: HashMap<String, Vec<(TopicId, i64)>> = HashMap::new();
        for topic in &fixture.topics {
            for tag in &topic.tags {
                sorted_sets
                    .entry(keys::tag_topics_key(tag))
                    .or_default()
                    .push((topic.tid, topic.timestamp));
            }
            sorted_sets
                .entry(keys::category_recent_key(topic.cid))
                .or_default()
                .push((topic.tid, topic.timestamp));
        }

        let clock: Arc<dyn Clock> = match fixture.now_ms {
            Some(now) => Arc::new(crate::clock::FixedClock(now)),
            None => Arc::new(SystemClock),
        };

        Self {
            topics: fixture.topics.into_iter().map(|t| (t.tid, t)).collect(),
            sorted_sets,
            denied_categories: fixture
                .denied_categories
                .into_iter()
                .map(|(uid, cids)| (uid, cids.into_iter().collect()))
                .collect(),
            blocks: fixture
                .blocks
                .into_iter()
                .map(|(uid, blocked)| (uid, blocked.into_iter().collect()))
                .collect(),
            clock,
            failing: HashSet::new(),
            calls: Default::default(),
            queried_keys: Mutex::new(Vec::new()),
        }
    }

    /// Override the clock used for search time windows.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Make a collaborator fail every call.
    pub fn with_failure(mut self, collaborator: Collaborator) -> Self {
        self.failing.insert(collaborator);
        self
    }

    /// The clock this forum considers "now".
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Number of calls made to a collaborator.
    pub fn calls(&self, collaborator: Collaborator) -> usize {
        self.calls[collaborator.index()].load(Ordering::SeqCst)
    }

    /// Every sorted-set key read so far, in call order.
    pub fn queried_keys(&self) -> Vec<String> {
        self.queried_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether `key` has been read.
    pub fn was_queried(&self, key: &str) -> bool {
        self.queried_keys().iter().any(|k| k == key)
    }

    /// Look up a topic regardless of deletion state.
    pub fn topic(&self, tid: TopicId) -> Option<&FixtureTopic> {
        self.topics.get(&tid)
    }

    fn enter(&self, collaborator: Collaborator) -> Result<(), SuggestError> {
        self.calls[collaborator.index()].fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&collaborator) {
            return Err(collaborator.unavailable());
        }
        Ok(())
    }

    fn can_read(&self, uid: UserId, cid: CategoryId) -> bool {
        self.denied_categories
            .get(&uid)
            .map(|denied| !denied.contains(&cid))
            .unwrap_or(true)
    }

    /// Union of the named sets by descending score, highest score winning
    /// for members present in several sets. Ties order by descending id.
    fn union_desc(&self, set_keys: &[String]) -> Vec<(TopicId, i64)> {
        self.queried_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(set_keys.iter().cloned());

        let mut best: HashMap<TopicId, i64> = HashMap::new();
        for key in set_keys {
            for (tid, score) in self.sorted_sets.get(key).into_iter().flatten() {
                let entry = best.entry(*tid).or_insert(*score);
                if *score > *entry {
                    *entry = *score;
                }
            }
        }

        let mut members: Vec<(TopicId, i64)> = best.into_iter().collect();
        members.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        members
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[async_trait]
impl TopicStore for InMemoryForum {
    async fn get_topic_tags(&self, tid: TopicId) -> Result<Vec<String>, SuggestError> {
        self.enter(Collaborator::Topics)?;
        Ok(self
            .topics
            .get(&tid)
            .map(|t| t.tags.clone())
            .unwrap_or_default())
    }

    async fn get_topic_fields(&self, tid: TopicId) -> Result<Option<TopicFields>, SuggestError> {
        self.enter(Collaborator::Topics)?;
        Ok(self.topics.get(&tid).map(|t| TopicFields {
            title: t.title.clone(),
            cid: t.cid,
        }))
    }

    async fn get_topic_category(&self, tid: TopicId) -> Result<Option<CategoryId>, SuggestError> {
        self.enter(Collaborator::Topics)?;
        Ok(self.topics.get(&tid).map(|t| t.cid))
    }

    async fn get_topics_by_tids(
        &self,
        tids: &[TopicId],
        _uid: UserId,
    ) -> Result<Vec<Option<TopicSummary>>, SuggestError> {
        self.enter(Collaborator::Topics)?;
        Ok(tids
            .iter()
            .map(|tid| {
                self.topics
                    .get(tid)
                    .filter(|t| !t.deleted)
                    .map(FixtureTopic::summary)
            })
            .collect())
    }
}

#[async_trait]
impl SortedSetStore for InMemoryForum {
    async fn get_sorted_set_rev_range(
        &self,
        keys: &[String],
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<TopicId>, SuggestError> {
        self.enter(Collaborator::SortedSets)?;
        let members = self.union_desc(keys).into_iter().skip(start);
        let tids = match stop {
            Some(stop) => members
                .take((stop + 1).saturating_sub(start))
                .map(|(tid, _)| tid)
                .collect(),
            None => members.map(|(tid, _)| tid).collect(),
        };
        Ok(tids)
    }

    async fn get_sorted_set_rev_range_by_score(
        &self,
        keys: &[String],
        start: usize,
        count: Option<usize>,
        min_score: i64,
    ) -> Result<Vec<TopicId>, SuggestError> {
        self.enter(Collaborator::SortedSets)?;
        let members = self
            .union_desc(keys)
            .into_iter()
            .filter(|(_, score)| *score >= min_score)
            .skip(start)
            .map(|(tid, _)| tid);
        Ok(match count {
            Some(count) => members.take(count).collect(),
            None => members.collect(),
        })
    }
}

#[async_trait]
impl SearchService for InMemoryForum {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SuggestError> {
        self.enter(Collaborator::Search)?;

        // Fixtures carry no post bodies; every field restriction matches titles.
        let wanted: HashSet<String> = terms(&query.query).into_iter().collect();
        if wanted.is_empty() {
            return Ok(SearchResponse::default());
        }

        let threshold = query.time_range_secs.map(|secs| {
            let range_ms = i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000);
            self.clock.now_millis().saturating_sub(range_ms)
        });

        let mut hits: Vec<&FixtureTopic> = self
            .topics
            .values()
            .filter(|t| !t.deleted)
            .filter(|t| query.categories.is_empty() || query.categories.contains(&t.cid))
            .filter(|t| self.can_read(query.uid, t.cid))
            .filter(|t| match (threshold, query.time_filter) {
                (None, _) => true,
                (Some(start), TimeFilter::Newer) => t.timestamp >= start,
                (Some(start), TimeFilter::Older) => t.timestamp <= start,
            })
            .filter(|t| {
                let title: HashSet<String> = terms(&t.title).into_iter().collect();
                match query.match_words {
                    MatchWords::Any => wanted.iter().any(|w| title.contains(w)),
                    MatchWords::All => wanted.iter().all(|w| title.contains(w)),
                }
            })
            .collect();

        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.tid.cmp(&a.tid)));
        debug!(query = %query.query, hits = hits.len(), "In-memory search");

        Ok(SearchResponse {
            tids: hits.into_iter().map(|t| t.tid).collect(),
        })
    }
}

#[async_trait]
impl PrivilegeFilter for InMemoryForum {
    async fn filter_tids(
        &self,
        privilege: Privilege,
        tids: Vec<TopicId>,
        uid: UserId,
    ) -> Result<Vec<TopicId>, SuggestError> {
        self.enter(Collaborator::Privileges)?;
        match privilege {
            Privilege::TopicsRead => Ok(tids
                .into_iter()
                .filter(|tid| {
                    self.topics
                        .get(tid)
                        .map(|t| self.can_read(uid, t.cid))
                        .unwrap_or(false)
                })
                .collect()),
        }
    }
}

#[async_trait]
impl BlockFilter for InMemoryForum {
    async fn filter_blocked(
        &self,
        uid: UserId,
        topics: Vec<TopicSummary>,
    ) -> Result<Vec<TopicSummary>, SuggestError> {
        self.enter(Collaborator::Blocks)?;
        let Some(blocked) = self.blocks.get(&uid) else {
            return Ok(topics);
        };
        Ok(topics
            .into_iter()
            .filter(|t| !blocked.contains(&t.uid))
            .collect())
    }
}
