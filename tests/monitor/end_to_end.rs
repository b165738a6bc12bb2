use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use stock_alerts::{AlertDirection, AppConfig, Delivery, Monitor, QuoteResolver, TickerOutcome};

use tracing::instrument::WithSubscriber;

use crate::common::{
    LogBuffer, chart_body, client_for, mock_chart, read_state, scratch_dir, setup_server,
    test_config,
};

const UP_BODY: &str = "📈 XYZ: +4.00% vs. open\nCurrent: 104.00 | Open: 100.00";

fn monitor(server: &MockServer, cfg: AppConfig) -> Monitor {
    let client = client_for(server);
    Monitor::new(&client, cfg).with_resolver(QuoteResolver::new(&client).pause(Duration::ZERO))
}

#[tokio::test]
async fn alert_latches_then_resets_inside_corridor() {
    let server = setup_server();
    let dir = scratch_dir("e2e-latch");
    let cfg = test_config(&server, &dir, &["XYZ"]);
    let state_file = cfg.state_file.clone();

    let push = server.mock(|when, then| {
        when.method(POST)
            .path("/alerts-test")
            .header("Title", "Stock Alert: XYZ")
            .header("Priority", "high")
            .body(UP_BODY);
        then.status(200);
    });
    let mut chart = mock_chart(
        &server,
        "XYZ",
        "1m",
        chart_body(&[(Some(100.0), Some(101.0)), (Some(101.0), Some(104.0))]),
    );

    let m = monitor(&server, cfg);

    // First breach fires and latches.
    let summary = m.run_once().await;
    assert!(summary.within_hours);
    assert_eq!(summary.alerts_fired(), 1);
    assert_eq!(
        summary.outcomes[0].1,
        TickerOutcome::Alerted {
            direction: AlertDirection::Up,
            pct: 4.0,
            delivery: Delivery::Sent,
        }
    );
    push.assert_hits(1);
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "up" }));

    // Same side again: no second push.
    let summary = m.run_once().await;
    assert!(matches!(
        summary.outcomes[0].1,
        TickerOutcome::AlreadyAlerted {
            direction: AlertDirection::Up,
            ..
        }
    ));
    push.assert_hits(1);

    // Back inside the corridor: latch cleared, nothing sent.
    chart.delete();
    chart = mock_chart(
        &server,
        "XYZ",
        "1m",
        chart_body(&[(Some(100.0), Some(101.0))]),
    );
    let summary = m.run_once().await;
    assert_eq!(summary.outcomes[0].1, TickerOutcome::Reset { pct: 1.0 });
    push.assert_hits(1);
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "none" }));

    // Still quiet on the next pass.
    let summary = m.run_once().await;
    assert_eq!(summary.outcomes[0].1, TickerOutcome::Quiet { pct: 1.0 });
    chart.assert_hits(2);
}

#[tokio::test]
async fn forced_delta_drives_direction_and_displayed_price() {
    let server = setup_server();
    let dir = scratch_dir("e2e-forced");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.test.enabled = true;
    cfg.test.force_delta_pct = Some(-5.0);
    let state_file = cfg.state_file.clone();

    let push = server.mock(|when, then| {
        when.method(POST)
            .path("/alerts-test")
            .body("📉 XYZ: -5.00% vs. open\nCurrent: 95.00 | Open: 100.00");
        then.status(200);
    });
    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(100.5))]));

    let summary = monitor(&server, cfg).run_once().await;

    push.assert();
    assert_eq!(
        summary.outcomes[0].1,
        TickerOutcome::Alerted {
            direction: AlertDirection::Down,
            pct: -5.0,
            delivery: Delivery::Sent,
        }
    );
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "down" }));
}

#[tokio::test]
async fn dry_run_latches_without_pushing() {
    let server = setup_server();
    let dir = scratch_dir("e2e-dry-run");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.test.dry_run = true;
    let state_file = cfg.state_file.clone();

    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test");
        then.status(200);
    });
    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(96.0))]));

    let summary = monitor(&server, cfg).run_once().await;

    push.assert_hits(0);
    assert_eq!(
        summary.outcomes[0].1,
        TickerOutcome::Alerted {
            direction: AlertDirection::Down,
            pct: -4.0,
            delivery: Delivery::DryRun,
        }
    );
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "down" }));
}

#[tokio::test]
async fn failed_push_still_latches_and_is_not_retried() {
    let server = setup_server();
    let dir = scratch_dir("e2e-push-failure");
    let cfg = test_config(&server, &dir, &["XYZ"]);
    let state_file = cfg.state_file.clone();

    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test");
        then.status(500);
    });
    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(104.0))]));

    let m = monitor(&server, cfg);
    let summary = m.run_once().await;
    assert_eq!(
        summary.outcomes[0].1,
        TickerOutcome::Alerted {
            direction: AlertDirection::Up,
            pct: 4.0,
            delivery: Delivery::Failed,
        }
    );
    assert_eq!(summary.failures(), 0);
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "up" }));

    m.run_once().await;
    push.assert_hits(1);
}

#[tokio::test]
async fn corrupt_state_file_counts_as_empty() {
    let server = setup_server();
    let dir = scratch_dir("e2e-corrupt-state");
    let cfg = test_config(&server, &dir, &["XYZ"]);
    let state_file = cfg.state_file.clone();
    std::fs::write(&state_file, "{ not json").unwrap();

    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test").body(UP_BODY);
        then.status(200);
    });
    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(104.0))]));

    let summary = monitor(&server, cfg).run_once().await;

    push.assert();
    assert_eq!(summary.alerts_fired(), 1);
    assert_eq!(read_state(&state_file), serde_json::json!({ "XYZ": "up" }));
}

#[tokio::test]
async fn unknown_state_entry_keeps_other_latches() {
    let server = setup_server();
    let dir = scratch_dir("e2e-unknown-state");
    let cfg = test_config(&server, &dir, &["AAPL"]);
    let state_file = cfg.state_file.clone();
    std::fs::write(&state_file, r#"{"AAPL":"up","OLD":"UP"}"#).unwrap();

    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test");
        then.status(200);
    });
    mock_chart(&server, "AAPL", "1m", chart_body(&[(Some(100.0), Some(105.0))]));

    let summary = monitor(&server, cfg).run_once().await;

    push.assert_hits(0);
    assert_eq!(
        summary.outcomes[0].1,
        TickerOutcome::AlreadyAlerted {
            direction: AlertDirection::Up,
            pct: 5.0,
        }
    );
}

#[tokio::test]
async fn unsaved_latch_still_reports_the_delivery() {
    let server = setup_server();
    let dir = scratch_dir("e2e-unsaved-latch");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    // The parent "directory" is a regular file, so the state cannot be written.
    let blocker = dir.join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    cfg.state_file = blocker.join("alert_state.json");

    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test");
        then.status(200);
    });
    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(104.0))]));

    let logs = LogBuffer::default();
    let summary = monitor(&server, cfg)
        .run_once()
        .with_subscriber(logs.dispatch())
        .await;

    push.assert_hits(1);
    assert!(matches!(summary.outcomes[0].1, TickerOutcome::Failed(_)));
    let text = logs.contents();
    assert!(text.contains("alert dispatched but latch not saved"), "{text}");
    assert!(text.contains("delivery=Sent"), "{text}");
}

#[tokio::test]
async fn alert_carries_headlines_when_news_is_enabled() {
    let server = setup_server();
    let dir = scratch_dir("e2e-news");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.news.enabled = true;
    let cache_file = cfg.company_cache_file.clone();

    mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(104.0))]));
    let meta = mock_chart(
        &server,
        "XYZ",
        "1d",
        crate::common::chart_body_named(&[(Some(100.0), Some(104.0))], Some("Xyzzy Inc.")),
    );
    let fresh = chrono::Utc::now().to_rfc2822();
    let feed = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/rss/search")
            .query_param("hl", "de");
        then.status(200).body(crate::common::rss_body(&[
            (
                "Xyzzy shares jump on guidance",
                "https://news.google.com/rss/articles/a1?url=https://pub.example/jump",
                fresh.as_str(),
            ),
            ("Weather report", "https://pub.example/weather", fresh.as_str()),
        ]));
    });
    let push = server.mock(|when, then| {
        when.method(POST)
            .path("/alerts-test")
            .header("Markdown", "yes")
            .header("Click", "https://pub.example/jump");
        then.status(200);
    });

    let summary = monitor(&server, cfg).run_once().await;

    meta.assert();
    feed.assert();
    push.assert();
    assert_eq!(summary.alerts_fired(), 1);

    let cache = read_state(&cache_file);
    assert_eq!(cache["XYZ"]["name"], "Xyzzy");
}
