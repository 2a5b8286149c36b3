//! CostWatch API - wire models and REST client
//!
//! Everything that crosses the HTTP boundary lives here:
//! - the entity models the backend serves (`DataSource`, `Check`, `Alert`)
//! - alert message classification and structured parsing
//! - the [`CostApi`] trait, the seam the rest of the workspace programs
//!   against, and its reqwest-backed implementation [`HttpApi`]
//!
//! Error responses are expected to carry a human-readable `detail`
//! string; when absent, a generic message derived from the HTTP status is
//! used instead. No authentication, pagination, or retry mechanism
//! exists at this boundary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use client::{CostApi, HttpApi, NewDataSource, ParseQueryRequest};
pub use error::ApiError;
pub use models::{Alert, AlertClass, Check, CheckStatus, DataSource, ParsedAlert, RunStatus};
