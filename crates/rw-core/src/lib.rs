//! Reportwall Core Library
//!
//! Report artifact models, configuration and refresh scheduling shared by
//! the storage, web and CLI crates.

pub mod config;
pub mod error;
pub mod report;
pub mod schedule;

pub use config::DashboardConfig;
pub use error::{ReportError, ReportResult};
pub use schedule::{RefreshDelay, RefreshPolicy, TimeOfDay};
