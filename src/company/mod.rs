//! Company display names for news queries, cached on disk without expiry.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::AlertsClient;
use crate::quote;
use crate::store::JsonFileMap;

/// Legal-form suffixes dropped from the end of a company name.
const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "corp", "co", "ltd", "plc", "ag", "se", "nv", "sa", "oyj", "ab", "spa", "s.p.a",
    "pte", "pteltd",
];

/// Where a company's display name came from.
///
/// Cache files written by other tools may carry labels this crate never
/// produces; those read back as [`NameSource::Cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameSource {
    #[serde(rename = "chart.longName", alias = "info.longName")]
    LongName,
    #[serde(rename = "chart.shortName", alias = "info.shortName")]
    ShortName,
    #[serde(rename = "base_ticker", alias = "fallback")]
    BaseTicker,
    /// Came from a cache entry with an unknown or missing label.
    #[default]
    #[serde(rename = "cache", other)]
    Cache,
}

/// Display-name metadata for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyMeta {
    /// The full ticker symbol, e.g. `SAP.DE`.
    pub ticker: String,
    /// Name without legal suffixes, e.g. `Apple`.
    pub name: String,
    /// Name as reported by the provider, e.g. `Apple Inc.`.
    pub raw_name: String,
    pub source: NameSource,
    /// Ticker without exchange suffix, e.g. `SAP`.
    pub base_ticker: String,
}

/// On-disk shape of a cache entry; the ticker is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedCompany {
    name: String,
    raw_name: String,
    #[serde(default)]
    source: NameSource,
    base_ticker: String,
}

impl CompanyMeta {
    fn from_cached(ticker: &str, c: CachedCompany) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: c.name,
            raw_name: c.raw_name,
            source: c.source,
            base_ticker: c.base_ticker,
        }
    }

    fn to_cached(&self) -> CachedCompany {
        CachedCompany {
            name: self.name.clone(),
            raw_name: self.raw_name.clone(),
            source: self.source,
            base_ticker: self.base_ticker.clone(),
        }
    }

    /// Metadata built from the ticker alone.
    #[must_use]
    pub fn fallback(ticker: &str) -> Self {
        let base = base_ticker(ticker);
        Self {
            ticker: ticker.to_string(),
            name: base.clone(),
            raw_name: base.clone(),
            source: NameSource::BaseTicker,
            base_ticker: base,
        }
    }

    /// Display name plus the lowercase keywords a relevant headline must contain one of.
    ///
    /// Keywords are the first word of the name and both ticker forms, sorted and
    /// de-duplicated.
    #[must_use]
    pub fn keywords(&self) -> (String, Vec<String>) {
        let spaced = self.name.replace([',', '.'], " ");
        let primary = spaced
            .split_whitespace()
            .next()
            .unwrap_or(&self.base_ticker);

        let mut req = vec![
            primary.to_lowercase(),
            self.ticker.to_lowercase(),
            self.base_ticker.to_lowercase(),
        ];
        req.sort();
        req.dedup();
        (self.name.clone(), req)
    }
}

/// Read-through company metadata cache backed by a JSON file.
#[derive(Debug)]
pub struct CompanyDirectory {
    client: AlertsClient,
    cache: JsonFileMap<CachedCompany>,
}

impl CompanyDirectory {
    /// Opens the cache at `path`; a missing or corrupt file starts empty.
    pub fn open(client: &AlertsClient, path: impl Into<PathBuf>) -> Self {
        Self {
            client: client.clone(),
            cache: JsonFileMap::load_or_default(path),
        }
    }

    /// Metadata for `symbol`, from cache or the chart endpoint.
    ///
    /// Never fails: provider errors degrade to [`CompanyMeta::fallback`], and
    /// cache write errors are logged.
    pub async fn lookup(&mut self, symbol: &str) -> CompanyMeta {
        if let Some(c) = self.cache.get(symbol) {
            return CompanyMeta::from_cached(symbol, c.clone());
        }

        let names = match quote::fetch_meta(&self.client, symbol).await {
            Ok(meta) => meta.map(|m| (m.long_name, m.short_name)),
            Err(e) => {
                tracing::debug!(symbol, error = %e, "company name lookup failed");
                None
            }
        };

        let meta = names
            .and_then(|(long, short)| {
                pick_name(long, NameSource::LongName).or_else(|| pick_name(short, NameSource::ShortName))
            })
            .map(|(raw, source)| {
                let clean = strip_legal_suffixes(&raw);
                CompanyMeta {
                    ticker: symbol.to_string(),
                    name: clean,
                    raw_name: raw,
                    source,
                    base_ticker: base_ticker(symbol),
                }
            })
            .filter(|m| !m.name.is_empty())
            .unwrap_or_else(|| CompanyMeta::fallback(symbol));

        self.cache.insert(symbol, meta.to_cached());
        if let Err(e) = self.cache.save() {
            tracing::warn!(symbol, error = %e, "could not write company cache");
        }
        meta
    }
}

fn pick_name(candidate: Option<String>, source: NameSource) -> Option<(String, NameSource)> {
    let name = candidate?.trim().to_string();
    (!name.is_empty()).then_some((name, source))
}

/// Removes trailing legal-form words, e.g. `Apple Inc.` → `Apple`, `SAP SE` → `SAP`.
#[must_use]
pub fn strip_legal_suffixes(name: &str) -> String {
    let mut parts: Vec<&str> = name
        .split_whitespace()
        .map(|p| p.trim_matches([',', '.']))
        .filter(|p| !p.is_empty())
        .collect();

    while let Some(last) = parts.last() {
        if LEGAL_SUFFIXES.contains(&last.to_lowercase().as_str()) {
            parts.pop();
        } else {
            break;
        }
    }

    if parts.is_empty() {
        name.trim().to_string()
    } else {
        parts.join(" ")
    }
}

/// Ticker without exchange suffix. Index symbols (`^...`) are returned unchanged.
#[must_use]
pub fn base_ticker(symbol: &str) -> String {
    if symbol.starts_with('^') {
        return symbol.to_string();
    }
    symbol
        .split_once('.')
        .map_or(symbol, |(base, _)| base)
        .to_string()
}
