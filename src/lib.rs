//! stock-alerts: threshold alerts for instrument moves against the session open.
//!
//! One pass ([`Monitor::run_once`]) checks the trading window, resolves a
//! price sample per ticker, runs the per-ticker direction latch and, on a new
//! breakout, pushes an ntfy notification enriched with recent headlines.

pub mod alert;
pub mod company;
pub mod config;
pub mod core;
pub mod logging;
pub mod market_hours;
pub mod monitor;
pub mod news;
pub mod notify;
pub mod quote;
pub mod store;

pub use alert::{AlertDirection, AlertState, Transition, classify, decide};
pub use company::{CompanyDirectory, CompanyMeta};
pub use config::AppConfig;
pub use crate::core::{AlertError, AlertsClient, AlertsClientBuilder};
pub use market_hours::MarketHours;
pub use monitor::{Monitor, RunSummary, TickerOutcome, compose_notification};
pub use news::{NewsBuilder, NewsItem, NewsOptions};
pub use notify::{Delivery, Notification, Notifier};
pub use quote::{Interval, PriceSample, QuoteResolver};
pub use store::JsonFileMap;
