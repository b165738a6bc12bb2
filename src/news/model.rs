use chrono::{DateTime, Utc};

/// A single headline from the search feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// The headline as published.
    pub title: String,
    /// The publisher (e.g., "Reuters"), when the feed names one.
    pub source: Option<String>,
    /// The link exactly as it appears in the feed.
    pub link: String,
    /// Publication time, when the feed carries a parseable one.
    pub published_at: Option<DateTime<Utc>>,
    /// Publisher URL behind `link`, filled in once resolved.
    pub canonical_url: Option<String>,
}

impl NewsItem {
    /// The best URL to hand to a reader.
    #[must_use]
    pub fn url(&self) -> &str {
        self.canonical_url.as_deref().unwrap_or(&self.link)
    }
}
