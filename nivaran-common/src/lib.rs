//! # Nivaran Common Library
//!
//! Shared code for all Nivaran civic-reporting services including:
//! - Error and result types
//! - Configuration file resolution
//! - Report vocabulary (issue categories, severity, report identifiers)

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Coordinates, IssueCategory, ReportId, Severity};
