//! Candidate sources for related-topic suggestions.
//!
//! Each source proposes a small, duplicate-free set of topic ids related to
//! a reference topic. None of them filter by privilege; that happens once
//! over the merged pool in the aggregator.
//!
//! - [`TagSource`]: topics sharing at least one tag
//! - [`SearchSource`]: title search within the same category
//! - [`CategorySource`]: most recently active topics in the same category,
//!   used only to backfill an under-filled page

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use suggest_types::{CategoryId, Cutoff, SuggestError, TopicId, UserId};

use crate::clock::Clock;
use crate::contracts::{
    MatchWords, SearchIn, SearchQuery, SearchService, SortedSetStore, TimeFilter, TopicStore,
};
use crate::keys;
use crate::shuffle::Shuffler;

/// A producer of candidate topic ids.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Candidates related to `tid`, never including `tid` itself.
    async fn candidates(
        &self,
        tid: TopicId,
        uid: UserId,
        cutoff: Cutoff,
    ) -> Result<Vec<TopicId>, SuggestError>;
}

/// Deduplicate `tids` preserving first occurrence, dropping `exclude`.
pub(crate) fn unique_without(
    tids: impl IntoIterator<Item = TopicId>,
    exclude: TopicId,
) -> Vec<TopicId> {
    let mut seen = HashSet::new();
    tids.into_iter()
        .filter(|tid| *tid != exclude && seen.insert(*tid))
        .collect()
}

/// Topics sharing at least one tag with the reference topic.
pub struct TagSource {
    topics: Arc<dyn TopicStore>,
    sets: Arc<dyn SortedSetStore>,
    shuffler: Arc<dyn Shuffler>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl TagSource {
    /// Create a tag source capped at `limit` candidates.
    pub fn new(
        topics: Arc<dyn TopicStore>,
        sets: Arc<dyn SortedSetStore>,
        shuffler: Arc<dyn Shuffler>,
        clock: Arc<dyn Clock>,
        limit: usize,
    ) -> Self {
        Self {
            topics,
            sets,
            shuffler,
            clock,
            limit,
        }
    }
}

#[async_trait]
impl CandidateSource for TagSource {
    fn name(&self) -> &'static str {
        "tags"
    }

    async fn candidates(
        &self,
        tid: TopicId,
        _uid: UserId,
        cutoff: Cutoff,
    ) -> Result<Vec<TopicId>, SuggestError> {
        let tags = self.topics.get_topic_tags(tid).await?;
        if tags.is_empty() {
            debug!(tid, "Reference topic has no tags");
            return Ok(Vec::new());
        }

        let set_keys = keys::tag_keys(&tags);
        let tids = match self.clock.window_start(cutoff) {
            None => {
                self.sets
                    .get_sorted_set_rev_range(&set_keys, 0, None)
                    .await?
            }
            Some(min_score) => {
                self.sets
                    .get_sorted_set_rev_range_by_score(&set_keys, 0, None, min_score)
                    .await?
            }
        };

        let mut tids = unique_without(tids, tid);
        self.shuffler.shuffle(&mut tids);
        tids.truncate(self.limit);

        debug!(tid, tags = tags.len(), candidates = tids.len(), "Tag candidates");
        Ok(tids)
    }
}

/// Title search restricted to the reference topic's category.
pub struct SearchSource {
    topics: Arc<dyn TopicStore>,
    search: Arc<dyn SearchService>,
    shuffler: Arc<dyn Shuffler>,
    limit: usize,
}

impl SearchSource {
    /// Create a search source capped at `limit` candidates.
    pub fn new(
        topics: Arc<dyn TopicStore>,
        search: Arc<dyn SearchService>,
        shuffler: Arc<dyn Shuffler>,
        limit: usize,
    ) -> Self {
        Self {
            topics,
            search,
            shuffler,
            limit,
        }
    }

    /// The query issued for a reference topic.
    pub fn build_query(title: &str, cid: CategoryId, uid: UserId, cutoff: Cutoff) -> SearchQuery {
        SearchQuery {
            query: title.to_string(),
            search_in: SearchIn::Titles,
            match_words: MatchWords::Any,
            categories: vec![cid],
            uid,
            return_ids: true,
            time_range_secs: cutoff.as_secs(),
            time_filter: TimeFilter::Newer,
        }
    }
}

#[async_trait]
impl CandidateSource for SearchSource {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn candidates(
        &self,
        tid: TopicId,
        uid: UserId,
        cutoff: Cutoff,
    ) -> Result<Vec<TopicId>, SuggestError> {
        let Some(fields) = self.topics.get_topic_fields(tid).await? else {
            debug!(tid, "Reference topic not found, skipping search");
            return Ok(Vec::new());
        };

        let query = Self::build_query(&fields.title, fields.cid, uid, cutoff);
        let response = self.search.search(&query).await?;

        let mut tids = unique_without(response.tids, tid);
        self.shuffler.shuffle(&mut tids);
        tids.truncate(self.limit);

        debug!(tid, cid = fields.cid, candidates = tids.len(), "Search candidates");
        Ok(tids)
    }
}

/// Most recently active topics in the reference topic's category.
pub struct CategorySource {
    topics: Arc<dyn TopicStore>,
    sets: Arc<dyn SortedSetStore>,
    shuffler: Arc<dyn Shuffler>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl CategorySource {
    /// Create a category source reading the `limit` most recent topics.
    pub fn new(
        topics: Arc<dyn TopicStore>,
        sets: Arc<dyn SortedSetStore>,
        shuffler: Arc<dyn Shuffler>,
        clock: Arc<dyn Clock>,
        limit: usize,
    ) -> Self {
        Self {
            topics,
            sets,
            shuffler,
            clock,
            limit,
        }
    }
}

#[async_trait]
impl CandidateSource for CategorySource {
    fn name(&self) -> &'static str {
        "category"
    }

    async fn candidates(
        &self,
        tid: TopicId,
        _uid: UserId,
        cutoff: Cutoff,
    ) -> Result<Vec<TopicId>, SuggestError> {
        let Some(cid) = self.topics.get_topic_category(tid).await? else {
            debug!(tid, "Reference topic not found, skipping category");
            return Ok(Vec::new());
        };

        let set_keys = [keys::category_recent_key(cid)];
        let tids = match self.clock.window_start(cutoff) {
            None => {
                self.sets
                    .get_sorted_set_rev_range(&set_keys, 0, Some(self.limit.saturating_sub(1)))
                    .await?
            }
            Some(min_score) => {
                self.sets
                    .get_sorted_set_rev_range_by_score(&set_keys, 0, Some(self.limit), min_score)
                    .await?
            }
        };

        // The index read is already bounded, so no cap after shuffling.
        let mut tids = unique_without(tids, tid);
        self.shuffler.shuffle(&mut tids);

        debug!(tid, cid, candidates = tids.len(), "Category candidates");
        Ok(tids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::memory::{FixtureTopic, ForumFixture, InMemoryForum};
    use crate::shuffle::IdentityShuffler;

    const NOW: i64 = 1_706_540_400_000;
    const DAY: i64 = 86_400_000;

    fn topic(tid: TopicId, cid: u64, title: &str, tags: &[&str], age_days: i64) -> FixtureTopic {
        FixtureTopic {
            tid,
            cid,
            uid: 100 + tid,
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            timestamp: NOW - age_days * DAY,
            deleted: false,
        }
    }

    fn forum(topics: Vec<FixtureTopic>) -> Arc<InMemoryForum> {
        Arc::new(
            InMemoryForum::new(ForumFixture {
                topics,
                ..Default::default()
            })
            .with_clock(Arc::new(FixedClock(NOW))),
        )
    }

    fn tag_source(forum: &Arc<InMemoryForum>, limit: usize) -> TagSource {
        TagSource::new(
            forum.clone(),
            forum.clone(),
            Arc::new(IdentityShuffler),
            Arc::new(FixedClock(NOW)),
            limit,
        )
    }

    fn category_source(forum: &Arc<InMemoryForum>, limit: usize) -> CategorySource {
        CategorySource::new(
            forum.clone(),
            forum.clone(),
            Arc::new(IdentityShuffler),
            Arc::new(FixedClock(NOW)),
            limit,
        )
    }

    #[test]
    fn test_unique_without() {
        assert_eq!(unique_without(vec![3, 1, 3, 2, 1], 2), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_tag_source_unions_tags_and_excludes_self() {
        let forum = forum(vec![
            topic(1, 5, "reference", &["x", "y"], 0),
            topic(2, 5, "two", &["x"], 1),
            topic(3, 6, "three", &["y"], 2),
            topic(4, 5, "four", &["x", "y"], 3),
            topic(5, 5, "five", &["z"], 4),
        ]);

        let tids = tag_source(&forum, 10)
            .candidates(1, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();

        assert_eq!(tids, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_tag_source_without_tags_skips_index() {
        let forum = forum(vec![topic(1, 5, "reference", &[], 0), topic(2, 5, "two", &[], 1)]);

        let tids = tag_source(&forum, 10)
            .candidates(1, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();

        assert!(tids.is_empty());
        assert!(forum.queried_keys().is_empty());
    }

    #[tokio::test]
    async fn test_tag_source_applies_cutoff() {
        let forum = forum(vec![
            topic(1, 5, "reference", &["x"], 0),
            topic(2, 5, "fresh", &["x"], 10),
            topic(3, 5, "stale", &["x"], 45),
        ]);

        let tids = tag_source(&forum, 10)
            .candidates(1, 0, Cutoff::from_months(1))
            .await
            .unwrap();

        assert_eq!(tids, vec![2]);
    }

    #[tokio::test]
    async fn test_tag_source_caps_candidates() {
        let mut topics = vec![topic(1, 5, "reference", &["x"], 0)];
        topics.extend((2..=30).map(|tid| topic(tid, 5, "other", &["x"], tid as i64)));
        let forum = forum(topics);

        let tids = tag_source(&forum, 10)
            .candidates(1, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();

        assert_eq!(tids.len(), 10);
        assert!(!tids.contains(&1));
    }

    #[tokio::test]
    async fn test_search_source_builds_title_query() {
        let query = SearchSource::build_query("Tokio runtime", 5, 9, Cutoff::from_months(1));
        assert_eq!(query.query, "Tokio runtime");
        assert_eq!(query.search_in, SearchIn::Titles);
        assert_eq!(query.match_words, MatchWords::Any);
        assert_eq!(query.categories, vec![5]);
        assert_eq!(query.uid, 9);
        assert!(query.return_ids);
        assert_eq!(query.time_range_secs, Some(2_592_000));
        assert_eq!(query.time_filter, TimeFilter::Newer);

        let unbounded = SearchSource::build_query("t", 5, 9, Cutoff::UNBOUNDED);
        assert_eq!(unbounded.time_range_secs, None);
    }

    #[tokio::test]
    async fn test_search_source_matches_titles_in_category() {
        let forum = forum(vec![
            topic(1, 5, "Tokio runtime tuning", &[], 0),
            topic(2, 5, "Runtime panics", &[], 1),
            topic(3, 6, "Tokio elsewhere", &[], 1),
            topic(4, 5, "Unrelated", &[], 1),
        ]);
        let source = SearchSource::new(forum.clone(), forum.clone(), Arc::new(IdentityShuffler), 10);

        let tids = source.candidates(1, 0, Cutoff::UNBOUNDED).await.unwrap();

        assert_eq!(tids, vec![2]);
    }

    #[tokio::test]
    async fn test_search_source_propagates_failure() {
        let forum = Arc::new(
            InMemoryForum::new(ForumFixture {
                topics: vec![topic(1, 5, "title", &[], 0)],
                ..Default::default()
            })
            .with_failure(crate::memory::Collaborator::Search),
        );
        let source = SearchSource::new(forum.clone(), forum.clone(), Arc::new(IdentityShuffler), 10);

        let result = source.candidates(1, 0, Cutoff::UNBOUNDED).await;

        assert!(matches!(result, Err(SuggestError::Search(_))));
    }

    #[tokio::test]
    async fn test_category_source_reads_most_recent() {
        let mut topics = vec![topic(1, 5, "reference", &[], 0)];
        topics.extend((2..=15).map(|tid| topic(tid, 5, "other", &[], tid as i64)));
        topics.push(topic(99, 6, "other category", &[], 0));
        let forum = forum(topics);

        let tids = category_source(&forum, 10)
            .candidates(1, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();

        // Ten most recent in cid 5 are 1..=10; the reference drops out.
        assert_eq!(tids, (2..=10).collect::<Vec<_>>());
        assert!(forum.was_queried(&keys::category_recent_key(5)));
    }

    #[tokio::test]
    async fn test_category_source_applies_cutoff() {
        let forum = forum(vec![
            topic(1, 5, "reference", &[], 0),
            topic(2, 5, "fresh", &[], 5),
            topic(3, 5, "stale", &[], 40),
        ]);

        let tids = category_source(&forum, 10)
            .candidates(1, 0, Cutoff::from_months(1))
            .await
            .unwrap();

        assert_eq!(tids, vec![2]);
    }

    #[tokio::test]
    async fn test_unknown_reference_yields_nothing() {
        let forum = forum(vec![topic(2, 5, "other", &["x"], 1)]);

        let category = category_source(&forum, 10)
            .candidates(42, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();
        let tags = tag_source(&forum, 10)
            .candidates(42, 0, Cutoff::UNBOUNDED)
            .await
            .unwrap();

        assert!(category.is_empty());
        assert!(tags.is_empty());
    }
}
