//! Core components shared by every stage of a monitoring pass.
//!
//! This module contains the foundational building blocks of the crate:
//! - The shared [`AlertsClient`] and its builder.
//! - The primary [`AlertError`] type.
//! - The retry policy applied to idempotent reads.

/// The shared client (`AlertsClient`), builder, and retry configuration.
pub mod client;
/// The primary error type (`AlertError`) for the crate.
pub mod error;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::AlertsClient`
pub use client::{AlertsClient, AlertsClientBuilder};
pub use error::AlertError;
