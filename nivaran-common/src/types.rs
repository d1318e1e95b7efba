//! Report vocabulary shared across Nivaran services
//!
//! Wire forms follow the public API: categories are lowercase tokens,
//! severities are capitalized words, report ids use the `NV-{year}-{serial}`
//! format shown to citizens.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Civic issue categories a citizen can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Water,
    Drainage,
    Roads,
    Garbage,
    Electricity,
    Infrastructure,
    Others,
}

impl IssueCategory {
    /// Lowercase wire token for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Water => "water",
            IssueCategory::Drainage => "drainage",
            IssueCategory::Roads => "roads",
            IssueCategory::Garbage => "garbage",
            IssueCategory::Electricity => "electricity",
            IssueCategory::Infrastructure => "infrastructure",
            IssueCategory::Others => "others",
        }
    }

    /// Parse a wire token, case-insensitively. Unrecognized tokens are `None`
    /// (callers decide whether that means "unknown" or "others").
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "water" => Some(IssueCategory::Water),
            "drainage" => Some(IssueCategory::Drainage),
            "roads" => Some(IssueCategory::Roads),
            "garbage" => Some(IssueCategory::Garbage),
            "electricity" => Some(IssueCategory::Electricity),
            "infrastructure" => Some(IssueCategory::Infrastructure),
            "others" => Some(IssueCategory::Others),
            _ => None,
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue severity as declared by the citizen or assessed by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Geographic coordinates attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Public report identifier, e.g. `NV-2026-04817`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Generate a new identifier for the current UTC year
    pub fn generate() -> Self {
        let serial = Uuid::new_v4().as_u128() % 100_000;
        ReportId(format!("NV-{}-{:05}", Utc::now().year(), serial))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReportId {
    fn from(value: String) -> Self {
        ReportId(value)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        ReportId(value.to_string())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
