//! # suggest-types
//!
//! Shared domain types for the topic suggestion system.
//!
//! This crate defines the data structures passed between the aggregator,
//! its candidate sources and the external collaborators:
//! - Topics: identifiers, reference fields and resolved summaries
//! - Cutoff: the relative time window applied by every candidate source
//! - PageWindow: the inclusive `[start, stop]` slice a caller asks for
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use suggest_types::{Cutoff, PageWindow};
//!
//! let cutoff = Cutoff::from_months(1);
//! assert_eq!(cutoff.as_millis(), 2_592_000_000);
//!
//! let window = PageWindow::from_range(0, 4);
//! assert_eq!(window.requested_len(), Some(5));
//! ```

pub mod config;
pub mod cutoff;
pub mod error;
pub mod page;
pub mod topic;

pub use config::{Settings, SuggestConfig};
pub use cutoff::{Cutoff, MILLIS_PER_MONTH};
pub use error::SuggestError;
pub use page::PageWindow;
pub use topic::{parse_topic_id, CategoryId, TopicFields, TopicId, TopicSummary, UserId};
