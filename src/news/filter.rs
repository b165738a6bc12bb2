//! Query construction and keyword relevance filtering.

use crate::news::NewsItem;

/// Finance terms appended to every query to push homonyms (a ticker that is
/// also a common word) out of the results. German and English.
const FINANCE_TERMS: &[&str] = &["Aktie", "Börse", "stock", "shares"];

/// Search string for a company: its display name or ticker, narrowed to
/// finance coverage.
#[must_use]
pub fn build_query(name: &str, ticker: &str) -> String {
    let name = name.trim();
    let ticker = ticker.trim();
    let subject = if name.is_empty() || name.eq_ignore_ascii_case(ticker) {
        format!("\"{ticker}\"")
    } else {
        format!("(\"{name}\" OR \"{ticker}\")")
    };
    format!("{subject} ({})", FINANCE_TERMS.join(" OR "))
}

/// Keeps items whose title contains at least one keyword, case-insensitively.
///
/// An empty keyword set keeps everything.
#[must_use]
pub fn filter_titles(items: Vec<NewsItem>, keywords: &[String]) -> Vec<NewsItem> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if needles.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            let title = item.title.to_lowercase();
            needles.iter().any(|k| title.contains(k.as_str()))
        })
        .collect()
}
