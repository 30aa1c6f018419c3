//! End-to-end test infrastructure for topic suggestions.
//!
//! Provides a shared TestHarness and fixture helpers for E2E tests covering
//! the full candidate-to-page pipeline over the in-memory forum.

use std::path::PathBuf;
use std::sync::Arc;

use suggest_engine::{
    Collaborator, Collaborators, FixtureTopic, ForumFixture, IdentityShuffler, InMemoryForum,
    SuggestionAggregator,
};
use suggest_types::{CategoryId, SuggestConfig, TopicId, TopicSummary, UserId};

/// Fixed "now" for every fixture (2024-01-29 approx).
pub const BASE_TS: i64 = 1_706_540_400_000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Shared test harness for E2E tests.
///
/// The fixture is written to a temp directory and loaded back through
/// `ForumFixture::load`, so every scenario also exercises the file path.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Where the fixture was written
    pub fixture_path: PathBuf,
    /// Forum serving every collaborator
    pub forum: Arc<InMemoryForum>,
}

impl TestHarness {
    /// Create a harness over `fixture`.
    pub fn new(fixture: ForumFixture) -> Self {
        Self::with_failures(fixture, &[])
    }

    /// Create a harness whose listed collaborators always fail.
    pub fn with_failures(fixture: ForumFixture, failing: &[Collaborator]) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let fixture_path = temp_dir.path().join("forum.json");

        let json = serde_json::to_string_pretty(&fixture).expect("Failed to serialize fixture");
        std::fs::write(&fixture_path, json).expect("Failed to write fixture");
        let loaded = ForumFixture::load(&fixture_path).expect("Failed to load fixture");

        let forum = failing
            .iter()
            .fold(InMemoryForum::new(loaded), |forum, c| forum.with_failure(*c));

        Self {
            _temp_dir: temp_dir,
            fixture_path,
            forum: Arc::new(forum),
        }
    }

    /// Aggregator with an identity shuffle, so candidate order is the
    /// collaborators' order.
    pub fn aggregator(&self) -> SuggestionAggregator {
        self.aggregator_with(SuggestConfig::default())
    }

    /// Identity-shuffle aggregator with custom limits.
    pub fn aggregator_with(&self, config: SuggestConfig) -> SuggestionAggregator {
        SuggestionAggregator::builder(Collaborators::uniform(self.forum.clone()))
            .with_config(config)
            .with_shuffler(Arc::new(IdentityShuffler))
            .with_clock(self.forum.clock())
            .build()
            .expect("Failed to build aggregator")
    }

    /// Aggregator shuffling with a seeded RNG.
    pub fn seeded_aggregator(&self, seed: u64) -> SuggestionAggregator {
        SuggestionAggregator::builder(Collaborators::uniform(self.forum.clone()))
            .with_config(SuggestConfig {
                shuffle_seed: Some(seed),
                ..Default::default()
            })
            .with_clock(self.forum.clock())
            .build()
            .expect("Failed to build aggregator")
    }
}

/// A fixture topic last active `age_days` before [`BASE_TS`].
pub fn topic(
    tid: TopicId,
    cid: CategoryId,
    uid: UserId,
    title: &str,
    tags: &[&str],
    age_days: i64,
) -> FixtureTopic {
    FixtureTopic {
        tid,
        cid,
        uid,
        title: title.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        timestamp: BASE_TS - age_days * DAY_MS,
        deleted: false,
    }
}

/// A fixture pinned to [`BASE_TS`] with no denials or blocks.
pub fn forum(topics: Vec<FixtureTopic>) -> ForumFixture {
    ForumFixture {
        topics,
        now_ms: Some(BASE_TS),
        ..Default::default()
    }
}

/// Topic ids of a result page, in order.
pub fn tids(topics: &[TopicSummary]) -> Vec<TopicId> {
    topics.iter().map(|t| t.tid).collect()
}

/// True when timestamps never increase along the page.
pub fn is_newest_first(topics: &[TopicSummary]) -> bool {
    topics.windows(2).all(|w| w[0].timestamp >= w[1].timestamp)
}
