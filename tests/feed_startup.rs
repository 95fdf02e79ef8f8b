//! Integration tests for startup: the single fetch and the decision to rotate.
//!
//! Each test runs its own wiremock server. The display element is a
//! recorder whose log outlives the rotation, so tests can check that a
//! failed or empty feed never touches the display.

use feedroll::app::{self, Finished};
use feedroll::config::Config;
use feedroll::element::{Element, ElementError};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Hide,
    Show,
    SetContent(String),
}

struct RecordingElement {
    visible: bool,
    log: Rc<RefCell<Vec<Op>>>,
}

impl Element for RecordingElement {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn hide(&mut self) -> Result<(), ElementError> {
        self.visible = false;
        self.log.borrow_mut().push(Op::Hide);
        Ok(())
    }

    fn show(&mut self) -> Result<(), ElementError> {
        self.visible = true;
        self.log.borrow_mut().push(Op::Show);
        Ok(())
    }

    fn set_inner_html(&mut self, html: &str) -> Result<(), ElementError> {
        self.log.borrow_mut().push(Op::SetContent(html.to_string()));
        Ok(())
    }
}

fn rss(items: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title>{}</channel></rss>"#,
        items.concat()
    )
}

async fn serve(status: u16, body: String) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@someone.rss"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mock_server
}

/// Short timings so a live rotation makes progress in real time.
fn test_config(server: &MockServer) -> Config {
    Config {
        feed_url: format!("{}/@someone.rss", server.uri()),
        hide_delay_ms: 1,
        swap_delay_ms: 1,
        display_ms: 5,
        ..Config::default()
    }
}

/// Runs the app for at most `limit` and returns whether the element was
/// created, the display log, and the outcome if `run` returned.
async fn run_for(
    config: &Config,
    limit: Duration,
) -> (bool, Vec<Op>, Option<Result<Finished, ElementError>>) {
    let client = app::build_client().unwrap();
    let created = Cell::new(false);
    let log = Rc::new(RefCell::new(Vec::new()));

    let outcome = tokio::time::timeout(
        limit,
        app::run(&client, config, || {
            created.set(true);
            Ok(RecordingElement {
                visible: false,
                log: Rc::clone(&log),
            })
        }),
    )
    .await
    .ok();

    let ops = log.borrow().clone();
    (created.get(), ops, outcome)
}

#[tokio::test]
async fn test_non_200_does_nothing() {
    let server = serve(404, rss(&["<item><description>x</description></item>"])).await;

    let (created, ops, outcome) = run_for(&test_config(&server), Duration::from_secs(5)).await;

    assert!(!created);
    assert!(ops.is_empty());
    match outcome {
        Some(Ok(Finished::FeedUnavailable(status))) => assert_eq!(status, StatusCode::NOT_FOUND),
        other => panic!("Expected FeedUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_does_nothing() {
    let server = serve(503, String::new()).await;

    let (created, ops, outcome) = run_for(&test_config(&server), Duration::from_secs(5)).await;

    assert!(!created);
    assert!(ops.is_empty());
    assert!(matches!(outcome, Some(Ok(Finished::FeedUnavailable(_)))));
}

#[tokio::test]
async fn test_zero_items_never_populates_element() {
    let server = serve(200, rss(&[])).await;

    let (created, ops, outcome) = run_for(&test_config(&server), Duration::from_secs(5)).await;

    assert!(!created);
    assert!(ops.is_empty());
    assert!(matches!(outcome, Some(Ok(Finished::NoEntries))));
}

#[tokio::test]
async fn test_malformed_feed_does_nothing() {
    let server = serve(200, "<rss><channel><item>".to_string()).await;

    let (created, ops, outcome) = run_for(&test_config(&server), Duration::from_secs(5)).await;

    assert!(!created);
    assert!(ops.is_empty());
    assert!(matches!(outcome, Some(Ok(Finished::LoadFailed(_)))));
}

#[tokio::test]
async fn test_items_without_descriptions_leave_element_untouched() {
    let server = serve(
        200,
        rss(&[
            "<item><link>https://example.com/1</link></item>",
            "<item><title>no body</title></item>",
        ]),
    )
    .await;

    let (_, ops, outcome) = run_for(&test_config(&server), Duration::from_secs(5)).await;

    assert!(ops.is_empty());
    assert!(matches!(outcome, Some(Ok(Finished::NothingToDisplay))));
}

#[tokio::test]
async fn test_rotation_starts_and_wraps() {
    let server = serve(
        200,
        rss(&[
            "<item><description>&lt;p&gt;one&lt;/p&gt;</description><link>https://example.com/1</link></item>",
            "<item><link>https://example.com/skipped</link></item>",
            "<item><description>three</description></item>",
        ]),
    )
    .await;

    let (created, ops, outcome) =
        run_for(&test_config(&server), Duration::from_millis(500)).await;

    assert!(created);
    assert!(outcome.is_none(), "rotation should still be running");

    let contents: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            Op::SetContent(html) => Some(html.as_str()),
            _ => None,
        })
        .take(4)
        .collect();
    assert_eq!(
        contents,
        vec![
            r#"<p>one</p><p><a href="https://example.com/1">https://example.com/1</a></p>"#,
            "three",
            r#"<p>one</p><p><a href="https://example.com/1">https://example.com/1</a></p>"#,
            "three",
        ]
    );

    // Hidden at start: no fade-out before the first entry
    assert_eq!(ops[0], Op::SetContent(contents[0].to_string()));
    assert_eq!(ops[1], Op::Show);
    assert_eq!(ops[2], Op::Hide);
}
