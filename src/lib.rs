//! Fleet flight analytics.
//!
//! Filters recorded drone flights by date, drone and project status, then
//! derives KPIs, per-drone distributions, weekly and cumulative series,
//! finance snapshots and short insight statements. Loading CSVs and
//! rendering are kept at the edges (`loader`, `output`); everything in
//! between is pure.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod finance;
pub mod insights;
pub mod loader;
pub mod output;
pub mod types;
pub mod util;

pub use error::{Error, Result};
