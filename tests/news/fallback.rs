use chrono::{Duration, Utc};
use httpmock::Method::GET;
use stock_alerts::NewsOptions;
use stock_alerts::news::collect_headlines;

use crate::common::{client_for, rss_body, setup_server};

fn options(lookback_hours: u32) -> NewsOptions {
    NewsOptions {
        lookback_hours,
        ..NewsOptions::default()
    }
}

#[tokio::test]
async fn secondary_locale_is_used_when_primary_has_nothing_relevant() {
    let server = setup_server();
    let fresh = (Utc::now() - Duration::hours(1)).to_rfc2822();

    let primary_body = rss_body(&[("Wetter in Berlin", "https://pub.example/wetter", fresh.as_str())]);
    let primary = server.mock(|when, then| {
        when.method(GET)
            .path("/rss/search")
            .query_param("hl", "de")
            .query_param("gl", "DE");
        then.status(200).body(primary_body);
    });

    let secondary_body = rss_body(&[
        (
            "Xyzzy shares jump",
            "https://news.google.com/rss/articles/abc?url=https://pub.example/xyzzy-jump",
            fresh.as_str(),
        ),
        ("Unrelated market wrap", "https://pub.example/wrap", fresh.as_str()),
    ]);
    let secondary = server.mock(|when, then| {
        when.method(GET)
            .path("/rss/search")
            .query_param("hl", "en")
            .query_param("gl", "US")
            .query_param("ceid", "US:en");
        then.status(200).body(secondary_body);
    });

    let items = collect_headlines(
        &client_for(&server),
        "Xyzzy",
        &["xyzzy".to_string()],
        &options(4),
    )
    .await;

    primary.assert();
    secondary.assert();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Xyzzy shares jump");
    assert_eq!(items[0].url(), "https://pub.example/xyzzy-jump");
}

#[tokio::test]
async fn relevant_primary_results_skip_the_fallback() {
    let server = setup_server();
    let fresh = Utc::now().to_rfc2822();

    let primary_body = rss_body(&[(
        "Xyzzy Aktie legt zu",
        "https://news.google.com/rss/articles/def?url=https://pub.example/de",
        fresh.as_str(),
    )]);
    let primary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "de");
        then.status(200).body(primary_body);
    });
    let secondary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "en");
        then.status(200).body(rss_body(&[]));
    });

    let items = collect_headlines(
        &client_for(&server),
        "Xyzzy",
        &["xyzzy".to_string()],
        &options(4),
    )
    .await;

    primary.assert();
    secondary.assert_hits(0);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].canonical_url.as_deref(), Some("https://pub.example/de"));
}

#[tokio::test]
async fn fallback_widens_short_lookback_windows() {
    let server = setup_server();
    // Too old for a 4h window, inside the 12h fallback floor.
    let eight_hours_ago = (Utc::now() - Duration::hours(8)).to_rfc2822();
    let body = rss_body(&[(
        "Xyzzy rallies",
        "https://news.google.com/rss/articles/ghi?url=https://pub.example/rally",
        eight_hours_ago.as_str(),
    )]);

    let primary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "de");
        then.status(200).body(body.clone());
    });
    let secondary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "en");
        then.status(200).body(body.clone());
    });

    let items = collect_headlines(
        &client_for(&server),
        "Xyzzy",
        &["xyzzy".to_string()],
        &options(4),
    )
    .await;

    primary.assert();
    secondary.assert();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].url(), "https://pub.example/rally");
}

#[tokio::test]
async fn longer_primary_lookback_is_kept_for_the_fallback() {
    let server = setup_server();
    let twenty_hours_ago = (Utc::now() - Duration::hours(20)).to_rfc2822();
    let primary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "de");
        then.status(200).body(rss_body(&[]));
    });
    let secondary = server.mock(|when, then| {
        when.method(GET).path("/rss/search").query_param("hl", "en");
        then.status(200).body(rss_body(&[(
            "Xyzzy outlook",
            "https://news.google.com/rss/articles/jkl?url=https://pub.example/outlook",
            twenty_hours_ago.as_str(),
        )]));
    });

    let items = collect_headlines(
        &client_for(&server),
        "Xyzzy",
        &["xyzzy".to_string()],
        &options(24),
    )
    .await;

    primary.assert();
    secondary.assert();
    assert_eq!(items.len(), 1);
}
