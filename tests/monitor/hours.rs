use chrono::{TimeZone, Utc};
use httpmock::Method::POST;
use stock_alerts::Monitor;

use crate::common::{chart_body, client_for, mock_chart, scratch_dir, setup_server, test_config};

#[tokio::test]
async fn closed_market_skips_everything() {
    let server = setup_server();
    let dir = scratch_dir("hours-closed");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.market_hours.enabled = true;
    cfg.market_hours.tz = chrono_tz::UTC;
    cfg.market_hours.start_hour = 8;
    cfg.market_hours.end_hour = 9;
    let state_file = cfg.state_file.clone();

    let chart = mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(110.0))]));
    let push = server.mock(|when, then| {
        when.method(POST).path("/alerts-test");
        then.status(200);
    });

    // Wednesday, noon UTC.
    let noon = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
    let summary = Monitor::new(&client_for(&server), cfg).run_once_at(noon).await;

    assert!(!summary.within_hours);
    assert!(summary.outcomes.is_empty());
    chart.assert_hits(0);
    push.assert_hits(0);
    assert!(!state_file.exists());
}

#[tokio::test]
async fn weekend_is_closed_even_inside_the_hour_window() {
    let server = setup_server();
    let dir = scratch_dir("hours-weekend");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.market_hours.enabled = true;
    cfg.market_hours.tz = chrono_tz::UTC;

    let chart = mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(100.0))]));

    // Saturday, 10:00 UTC.
    let saturday = Utc.with_ymd_and_hms(2026, 10, 17, 10, 0, 0).unwrap();
    let summary = Monitor::new(&client_for(&server), cfg).run_once_at(saturday).await;

    assert!(!summary.within_hours);
    chart.assert_hits(0);
}

#[tokio::test]
async fn test_mode_bypasses_the_window() {
    let server = setup_server();
    let dir = scratch_dir("hours-bypass");
    let mut cfg = test_config(&server, &dir, &["XYZ"]);
    cfg.market_hours.enabled = true;
    cfg.market_hours.tz = chrono_tz::UTC;
    cfg.market_hours.start_hour = 8;
    cfg.market_hours.end_hour = 9;
    cfg.test.enabled = true;

    let chart = mock_chart(&server, "XYZ", "1m", chart_body(&[(Some(100.0), Some(101.0))]));

    let noon = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
    let summary = Monitor::new(&client_for(&server), cfg).run_once_at(noon).await;

    assert!(summary.within_hours);
    assert_eq!(summary.outcomes.len(), 1);
    chart.assert_hits(1);
}
