//! # pdreport
//!
//! Incident reports built from the PagerDuty REST API.
//!
//! - [`reporting`]: calendar iteration, date filtering, pivot aggregation and
//!   CSV rendering for the `count` and `list` reports
//! - [`pagerduty`]: the HTTP client and lazy pagination over incident windows
//! - [`config`]: layered configuration and validated report options

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pagerduty;
pub mod reporting;

pub use error::{AppError, Result};
