//! Error path E2E tests.
//!
//! Collaborator failures surface to the caller unchanged. Stale ids and bad
//! input are handled without panicking.

use pretty_assertions::assert_eq;

use e2e_tests::{forum, tids, topic, TestHarness};
use suggest_engine::{Collaborator, ForumFixture};
use suggest_types::{PageWindow, SuggestError};

fn fixture() -> ForumFixture {
    let mut stale = topic(3, 1, 102, "Deleted neighbour", &["x"], 1);
    stale.deleted = true;
    forum(vec![
        topic(1, 1, 100, "Reference", &["x"], 0),
        topic(2, 1, 101, "Neighbour", &["x"], 2),
        stale,
    ])
}

async fn run_failing(collaborator: Collaborator) -> (TestHarness, SuggestError) {
    let harness = TestHarness::with_failures(fixture(), &[collaborator]);
    let err = harness
        .aggregator()
        .get_suggested_topics(1, 0, PageWindow::from_range(0, 4), 0)
        .await
        .unwrap_err();
    (harness, err)
}

#[tokio::test]
async fn test_topic_store_failure() {
    let (_harness, err) = run_failing(Collaborator::Topics).await;
    assert!(matches!(err, SuggestError::Store(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_sorted_set_failure() {
    let (_harness, err) = run_failing(Collaborator::SortedSets).await;
    assert!(matches!(err, SuggestError::Store(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_search_failure_stops_pipeline() {
    let (harness, err) = run_failing(Collaborator::Search).await;
    assert!(matches!(err, SuggestError::Search(_)), "got {:?}", err);
    assert_eq!(harness.forum.calls(Collaborator::Privileges), 0);
}

#[tokio::test]
async fn test_privilege_failure_is_not_swallowed() {
    let (harness, err) = run_failing(Collaborator::Privileges).await;
    assert!(matches!(err, SuggestError::Privilege(_)), "got {:?}", err);
    assert_eq!(harness.forum.calls(Collaborator::Blocks), 0);
}

#[tokio::test]
async fn test_block_list_failure() {
    let (_harness, err) = run_failing(Collaborator::Blocks).await;
    assert!(matches!(err, SuggestError::BlockList(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_deleted_topic_dropped() {
    let harness = TestHarness::new(fixture());

    let result = harness
        .aggregator()
        .get_suggested_topics(1, 0, PageWindow::unbounded(0), 0)
        .await
        .unwrap();

    assert_eq!(tids(&result), vec![2]);
}

#[test]
fn test_invalid_window() {
    assert!(matches!(
        PageWindow::new(0, -5),
        Err(SuggestError::InvalidInput(_))
    ));
}

#[test]
fn test_duplicate_fixture_ids_rejected() {
    let json = r#"{"topics": [
        {"tid": 1, "cid": 1, "uid": 1, "title": "a", "timestamp": 0},
        {"tid": 1, "cid": 1, "uid": 1, "title": "b", "timestamp": 0}
    ]}"#;
    assert!(matches!(
        ForumFixture::from_json_str(json),
        Err(SuggestError::Fixture(_))
    ));
}

#[test]
fn test_missing_fixture_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = ForumFixture::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(SuggestError::Fixture(_))));
}
