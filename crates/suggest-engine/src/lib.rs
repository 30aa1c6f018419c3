//! # suggest-engine
//!
//! Related-topic suggestions for a discussion forum.
//!
//! Given a reference topic and a viewer, this crate assembles a page of
//! other topics the viewer is likely to care about, drawing candidates from
//! three sources:
//!
//! - **Tags**: topics sharing at least one tag with the reference
//! - **Search**: title search within the reference topic's category
//! - **Category**: most recently active topics in the same category,
//!   read only when the first two cannot fill the requested page
//!
//! The merged pool is shuffled, filtered by read privilege and block lists,
//! sliced to the requested window and sorted newest first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use suggest_engine::{Collaborators, InMemoryForum, ForumFixture, SuggestionAggregator};
//! use suggest_types::PageWindow;
//!
//! let forum = Arc::new(InMemoryForum::new(ForumFixture::load(path)?));
//! let aggregator = SuggestionAggregator::builder(Collaborators::uniform(forum))
//!     .build()?;
//!
//! let topics = aggregator
//!     .get_suggested_topics(42, 7, PageWindow::from_range(0, 4), 6)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`]: the suggestion pipeline
//! - [`sources`]: tag, search and category candidate sources
//! - [`contracts`]: traits for the external collaborators
//! - [`memory`]: fixture-backed collaborators for tests and the CLI
//! - [`keys`]: sorted-set key naming
//! - [`shuffle`]: injectable randomness
//! - [`clock`]: injectable time

pub mod aggregator;
pub mod clock;
pub mod contracts;
pub mod keys;
pub mod memory;
pub mod shuffle;
pub mod sources;

// Re-export main types at crate root
pub use aggregator::{AggregatorBuilder, Collaborators, SuggestionAggregator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use contracts::{
    BlockFilter, MatchWords, Privilege, PrivilegeFilter, SearchIn, SearchQuery, SearchResponse,
    SearchService, SortedSetStore, TimeFilter, TopicStore,
};
pub use memory::{Collaborator, FixtureTopic, ForumFixture, InMemoryForum};
pub use shuffle::{IdentityShuffler, RandomShuffler, Shuffler};
pub use sources::{CandidateSource, CategorySource, SearchSource, TagSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::aggregator::{Collaborators, SuggestionAggregator};
    pub use crate::contracts::{
        BlockFilter, PrivilegeFilter, SearchService, SortedSetStore, TopicStore,
    };
    pub use crate::memory::{ForumFixture, InMemoryForum};
    pub use suggest_types::{Cutoff, PageWindow, SuggestError, TopicId, TopicSummary, UserId};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;

    use suggest_types::PageWindow;

    const NOW: i64 = 1_706_540_400_000;
    const DAY: i64 = 86_400_000;

    fn fixture() -> ForumFixture {
        let topic = |tid: u64, cid: u64, title: &str, tags: &[&str], age_days: i64| FixtureTopic {
            tid,
            cid,
            uid: 100 + tid,
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            timestamp: NOW - age_days * DAY,
            deleted: false,
        };
        ForumFixture {
            topics: vec![
                topic(1, 5, "Tokio runtime tuning", &["rust", "async"], 0),
                topic(2, 5, "Choosing an async runtime", &["async"], 3),
                topic(3, 5, "Tokio worker threads", &[], 10),
                topic(4, 5, "Release notes", &[], 1),
                topic(5, 6, "Rust in embedded", &["rust"], 200),
                topic(6, 5, "Old tokio thread", &[], 400),
            ],
            now_ms: Some(NOW),
            ..Default::default()
        }
    }

    /// Full pipeline over the in-memory forum with default sources.
    #[tokio::test]
    async fn test_full_suggestion_flow() {
        let forum = Arc::new(InMemoryForum::new(fixture()));
        let aggregator = SuggestionAggregator::builder(Collaborators::uniform(forum.clone()))
            .with_shuffler(Arc::new(IdentityShuffler))
            .with_clock(forum.clock())
            .build()
            .unwrap();

        // Tags give 2 and 5, search adds 3 and 6. A 10-wide page backfills
        // from the category, adding 4.
        let topics = aggregator
            .get_suggested_topics(1, 0, PageWindow::from_range(0, 9), 0)
            .await
            .unwrap();
        let tids: Vec<_> = topics.iter().map(|t| t.tid).collect();
        assert_eq!(tids, vec![4, 2, 3, 5, 6]);
        assert!(forum.was_queried("cid:5:tids:lastposttime"));

        // A six-month cutoff drops topics 5 and 6.
        let topics = aggregator
            .get_suggested_topics(1, 0, PageWindow::from_range(0, 9), 6)
            .await
            .unwrap();
        let tids: Vec<_> = topics.iter().map(|t| t.tid).collect();
        assert_eq!(tids, vec![4, 2, 3]);
    }

    /// Cutoffs too large to represent behave like no cutoff at all.
    #[tokio::test]
    async fn test_huge_cutoff_saturates() {
        let forum = Arc::new(InMemoryForum::new(fixture()));
        let aggregator = SuggestionAggregator::builder(Collaborators::uniform(forum.clone()))
            .with_shuffler(Arc::new(IdentityShuffler))
            .with_clock(forum.clock())
            .build()
            .unwrap();

        let topics = aggregator
            .get_suggested_topics(1, 0, PageWindow::from_range(0, 4), u32::MAX)
            .await
            .unwrap();
        let tids: Vec<_> = topics.iter().map(|t| t.tid).collect();
        assert_eq!(tids, vec![4, 2, 3, 5, 6]);
    }

    #[tokio::test]
    async fn test_unknown_reference_topic() {
        let forum = Arc::new(InMemoryForum::new(fixture()));
        let aggregator = SuggestionAggregator::builder(Collaborators::uniform(forum.clone()))
            .with_clock(forum.clock())
            .build()
            .unwrap();

        let topics = aggregator
            .get_suggested_topics(999, 0, PageWindow::from_range(0, 4), 0)
            .await
            .unwrap();
        assert!(topics.is_empty());
    }
}
