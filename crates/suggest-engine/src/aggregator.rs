//! Related-topic suggestion aggregator.
//!
//! This module implements the `SuggestionAggregator`, which merges the tag,
//! search and category candidate sources into one privacy-filtered,
//! paginated list of topics ordered by recency.
//!
//! Pipeline for one request:
//! 1. tag and search sources run concurrently; the first failure aborts
//! 2. their union is deduplicated
//! 3. a bounded page that the union cannot fill triggers the category source
//! 4. the pool is shuffled and filtered by read privilege as a whole
//! 5. records are resolved; stale ids and the reference topic are dropped
//! 6. authors blocked by the viewer are dropped
//! 7. the page window is sliced, then sorted by timestamp descending
//!
//! Filtering happens before slicing, so a page can come back shorter than
//! requested. Short pages are not backfilled.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use suggest_types::{
    Cutoff, PageWindow, SuggestConfig, SuggestError, TopicId, TopicSummary, UserId,
};

use crate::clock::{Clock, SystemClock};
use crate::contracts::{
    BlockFilter, Privilege, PrivilegeFilter, SearchService, SortedSetStore, TopicStore,
};
use crate::shuffle::{RandomShuffler, Shuffler};
use crate::sources::{unique_without, CandidateSource, CategorySource, SearchSource, TagSource};

/// Handles to every external collaborator.
#[derive(Clone)]
pub struct Collaborators {
    /// Topic records
    pub topics: Arc<dyn TopicStore>,
    /// Tag and category recency indices
    pub sorted_sets: Arc<dyn SortedSetStore>,
    /// Full-text search
    pub search: Arc<dyn SearchService>,
    /// Read-privilege rules
    pub privileges: Arc<dyn PrivilegeFilter>,
    /// User block lists
    pub blocks: Arc<dyn BlockFilter>,
}

impl Collaborators {
    /// Use one backend for every collaborator.
    pub fn uniform<B>(backend: Arc<B>) -> Self
    where
        B: TopicStore + SortedSetStore + SearchService + PrivilegeFilter + BlockFilter + 'static,
    {
        Self {
            topics: backend.clone(),
            sorted_sets: backend.clone(),
            search: backend.clone(),
            privileges: backend.clone(),
            blocks: backend,
        }
    }
}

/// Builder for [`SuggestionAggregator`].
pub struct AggregatorBuilder {
    collaborators: Collaborators,
    config: SuggestConfig,
    shuffler: Option<Arc<dyn Shuffler>>,
    clock: Arc<dyn Clock>,
    tag_source: Option<Arc<dyn CandidateSource>>,
    search_source: Option<Arc<dyn CandidateSource>>,
    category_source: Option<Arc<dyn CandidateSource>>,
}

impl AggregatorBuilder {
    /// Set source limits and the shuffle seed.
    pub fn with_config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the shuffler. Overrides `shuffle_seed`.
    pub fn with_shuffler(mut self, shuffler: Arc<dyn Shuffler>) -> Self {
        self.shuffler = Some(shuffler);
        self
    }

    /// Replace the clock used for cutoff windows.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the tag candidate source.
    pub fn with_tag_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.tag_source = Some(source);
        self
    }

    /// Replace the search candidate source.
    pub fn with_search_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.search_source = Some(source);
        self
    }

    /// Replace the category fallback source.
    pub fn with_category_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.category_source = Some(source);
        self
    }

    /// Validate the configuration and assemble the aggregator.
    pub fn build(self) -> Result<SuggestionAggregator, SuggestError> {
        self.config.validate().map_err(SuggestError::Config)?;

        let c = &self.collaborators;
        let shuffler = self
            .shuffler
            .unwrap_or_else(|| Arc::new(RandomShuffler::from_seed(self.config.shuffle_seed)));

        let tag_source = self.tag_source.unwrap_or_else(|| {
            Arc::new(TagSource::new(
                c.topics.clone(),
                c.sorted_sets.clone(),
                shuffler.clone(),
                self.clock.clone(),
                self.config.max_source_candidates,
            ))
        });
        let search_source = self.search_source.unwrap_or_else(|| {
            Arc::new(SearchSource::new(
                c.topics.clone(),
                c.search.clone(),
                shuffler.clone(),
                self.config.max_source_candidates,
            ))
        });
        let category_source = self.category_source.unwrap_or_else(|| {
            Arc::new(CategorySource::new(
                c.topics.clone(),
                c.sorted_sets.clone(),
                shuffler.clone(),
                self.clock.clone(),
                self.config.category_fallback_limit,
            ))
        });

        Ok(SuggestionAggregator {
            tag_source,
            search_source,
            category_source,
            topics: self.collaborators.topics,
            privileges: self.collaborators.privileges,
            blocks: self.collaborators.blocks,
            shuffler,
        })
    }
}

/// Merges candidate sources into a page of related topics.
pub struct SuggestionAggregator {
    tag_source: Arc<dyn CandidateSource>,
    search_source: Arc<dyn CandidateSource>,
    category_source: Arc<dyn CandidateSource>,
    topics: Arc<dyn TopicStore>,
    privileges: Arc<dyn PrivilegeFilter>,
    blocks: Arc<dyn BlockFilter>,
    shuffler: Arc<dyn Shuffler>,
}

impl SuggestionAggregator {
    /// Start building an aggregator over `collaborators`.
    pub fn builder(collaborators: Collaborators) -> AggregatorBuilder {
        AggregatorBuilder {
            collaborators,
            config: SuggestConfig::default(),
            shuffler: None,
            clock: Arc::new(SystemClock),
            tag_source: None,
            search_source: None,
            category_source: None,
        }
    }

    /// Suggested topics related to `tid`, as seen by viewer `uid`.
    ///
    /// `cutoff_months == 0` applies no time restriction; any other value
    /// keeps only topics active within that many 30-day months.
    #[instrument(skip(self))]
    pub async fn get_suggested_topics(
        &self,
        tid: TopicId,
        uid: UserId,
        window: PageWindow,
        cutoff_months: u32,
    ) -> Result<Vec<TopicSummary>, SuggestError> {
        let cutoff = Cutoff::from_months(cutoff_months);

        let (tag_tids, search_tids) = tokio::try_join!(
            self.run_source(self.tag_source.as_ref(), tid, uid, cutoff),
            self.run_source(self.search_source.as_ref(), tid, uid, cutoff),
        )?;

        let mut tids = unique_without(tag_tids.into_iter().chain(search_tids), tid);

        if window.needs_backfill(tids.len()) {
            debug!(
                primary = tids.len(),
                requested = ?window.requested_len(),
                "Primary sources under-filled the page, reading category"
            );
            let category_tids = self
                .run_source(self.category_source.as_ref(), tid, uid, cutoff)
                .await?;
            tids = unique_without(tids.into_iter().chain(category_tids), tid);
        }

        self.shuffler.shuffle(&mut tids);
        let pool_size = tids.len();

        let readable = self.readable(tids, uid).await?;
        let topics = self.resolve(&readable, tid, uid).await?;
        let visible = self.unblocked(topics, uid).await?;
        let filtered = visible.len();

        let mut page = window.apply(visible);
        // Stable sort: equal timestamps keep pool order.
        page.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        info!(
            pool = pool_size,
            readable = readable.len(),
            visible = filtered,
            returned = page.len(),
            "Suggested topics ready"
        );
        Ok(page)
    }

    async fn run_source(
        &self,
        source: &dyn CandidateSource,
        tid: TopicId,
        uid: UserId,
        cutoff: Cutoff,
    ) -> Result<Vec<TopicId>, SuggestError> {
        source
            .candidates(tid, uid, cutoff)
            .await
            .inspect_err(|e| warn!(source = source.name(), error = %e, "Candidate source failed"))
    }

    /// Read-privilege filter over the whole pool.
    async fn readable(&self, tids: Vec<TopicId>, uid: UserId) -> Result<Vec<TopicId>, SuggestError> {
        let offered: HashSet<TopicId> = tids.iter().copied().collect();
        let readable = self
            .privileges
            .filter_tids(Privilege::TopicsRead, tids, uid)
            .await
            .inspect_err(|e| warn!(error = %e, "Privilege filter failed"))?;

        if let Some(stray) = readable.iter().find(|tid| !offered.contains(tid)) {
            warn!(tid = stray, "Privilege filter returned an id it was not given");
            return Err(SuggestError::malformed(
                "privileges",
                format!("returned unknown topic id {}", stray),
            ));
        }
        Ok(readable)
    }

    /// Resolve records, dropping stale ids and the reference topic.
    async fn resolve(
        &self,
        tids: &[TopicId],
        reference: TopicId,
        uid: UserId,
    ) -> Result<Vec<TopicSummary>, SuggestError> {
        let records = self
            .topics
            .get_topics_by_tids(tids, uid)
            .await
            .inspect_err(|e| warn!(error = %e, "Topic lookup failed"))?;

        if records.len() != tids.len() {
            warn!(
                requested = tids.len(),
                returned = records.len(),
                "Topic lookup returned the wrong number of records"
            );
            return Err(SuggestError::malformed(
                "topics",
                format!("expected {} records, got {}", tids.len(), records.len()),
            ));
        }

        let mut seen = HashSet::new();
        let mut topics = Vec::with_capacity(records.len());
        for (requested, record) in tids.iter().zip(records) {
            let Some(topic) = record else {
                debug!(tid = requested, "Dropping topic that no longer resolves");
                continue;
            };
            if topic.tid != *requested {
                return Err(SuggestError::malformed(
                    "topics",
                    format!("asked for topic {}, got {}", requested, topic.tid),
                ));
            }
            if topic.tid != reference && seen.insert(topic.tid) {
                topics.push(topic);
            }
        }
        Ok(topics)
    }

    /// Drop topics by authors the viewer blocked.
    async fn unblocked(
        &self,
        topics: Vec<TopicSummary>,
        uid: UserId,
    ) -> Result<Vec<TopicSummary>, SuggestError> {
        let offered: HashSet<TopicId> = topics.iter().map(|t| t.tid).collect();
        let visible = self
            .blocks
            .filter_blocked(uid, topics)
            .await
            .inspect_err(|e| warn!(error = %e, "Block filter failed"))?;

        if let Some(stray) = visible.iter().find(|t| !offered.contains(&t.tid)) {
            warn!(tid = stray.tid, "Block filter returned a topic it was not given");
            return Err(SuggestError::malformed(
                "blocks",
                format!("returned unknown topic id {}", stray.tid),
            ));
        }
        Ok(visible)
    }
}
