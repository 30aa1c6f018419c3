//! Command implementations for topic-suggest.
//!
//! Handles:
//! - suggest: Load the fixture, build the aggregator, print a page of topics
//! - topic: Show one fixture topic
//! - config: Print the effective settings

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use suggest_engine::{Collaborators, ForumFixture, InMemoryForum, SuggestionAggregator};
use suggest_types::{parse_topic_id, PageWindow, Settings, TopicSummary, UserId};

/// Options for a single suggestion request.
#[derive(Debug, Clone)]
pub struct SuggestRequest {
    /// Reference topic id as typed by the user
    pub tid: String,
    /// Viewer
    pub uid: UserId,
    /// First index of the page
    pub start: usize,
    /// Last index of the page, -1 for unbounded
    pub stop: i64,
    /// Overrides `default_cutoff_months`
    pub cutoff_months: Option<u32>,
    /// Overrides `suggest.shuffle_seed`
    pub seed: Option<u64>,
}

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    fixture_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    if let Some(fixture) = fixture_override {
        settings.fixture_path = Some(fixture.to_string());
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over settings.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn open_forum(settings: &Settings) -> Result<InMemoryForum> {
    let path = settings
        .fixture_path
        .as_deref()
        .context("No fixture configured (use --fixture or set fixture_path)")?;
    info!("Loading fixture from {}", path);
    let fixture = ForumFixture::load(Path::new(path))
        .with_context(|| format!("Failed to load fixture {}", path))?;
    debug!(topics = fixture.topics.len(), "Fixture loaded");
    Ok(InMemoryForum::new(fixture))
}

/// Run one suggestion request against the configured fixture.
pub async fn run_suggest(settings: &Settings, request: SuggestRequest) -> Result<Vec<TopicSummary>> {
    let tid = parse_topic_id(&request.tid)?;
    let window = PageWindow::new(request.start, request.stop)?;
    let cutoff_months = request
        .cutoff_months
        .unwrap_or(settings.default_cutoff_months);

    let mut config = settings.suggest.clone();
    if request.seed.is_some() {
        config.shuffle_seed = request.seed;
    }

    let forum = Arc::new(open_forum(settings)?);
    let aggregator = SuggestionAggregator::builder(Collaborators::uniform(forum.clone()))
        .with_config(config)
        .with_clock(forum.clock())
        .build()
        .context("Invalid aggregator configuration")?;

    let timeout = Duration::from_millis(settings.request_timeout_ms);
    let topics = tokio::time::timeout(
        timeout,
        aggregator.get_suggested_topics(tid, request.uid, window, cutoff_months),
    )
    .await
    .with_context(|| format!("Suggestion request timed out after {:?}", timeout))?
    .context("Suggestion request failed")?;

    Ok(topics)
}

/// Render topics as JSON or one line per topic.
pub fn format_topics(topics: &[TopicSummary], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(topics).context("Failed to encode topics");
    }
    if topics.is_empty() {
        return Ok("No suggested topics".to_string());
    }
    let lines: Vec<String> = topics
        .iter()
        .map(|t| {
            format!(
                "{:>6}  {}  cid={} uid={}  {}",
                t.tid,
                format_millis(t.timestamp),
                t.cid,
                t.uid,
                t.title
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Describe one fixture topic.
pub fn show_topic(settings: &Settings, raw_tid: &str) -> Result<String> {
    let tid = parse_topic_id(raw_tid)?;
    let forum = open_forum(settings)?;
    let topic = forum
        .topic(tid)
        .with_context(|| format!("Topic {} not found in fixture", tid))?;

    let mut out = vec![
        format!("Topic {}: {}", topic.tid, topic.title),
        format!("  Category: {}", topic.cid),
        format!("  Author: {}", topic.uid),
        format!("  Last activity: {}", format_millis(topic.timestamp)),
    ];
    if topic.tags.is_empty() {
        out.push("  Tags: (none)".to_string());
    } else {
        out.push(format!("  Tags: {}", topic.tags.join(", ")));
    }
    if topic.deleted {
        out.push("  Deleted".to_string());
    }
    Ok(out.join("\n"))
}

/// Effective settings as TOML.
pub fn show_config(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to encode settings")
}
