//! nivaran-iv library interface
//!
//! Image provenance and authenticity validation for citizen-submitted
//! issue reports: source forensics, evidence fusion, and the decision
//! engine that turns raw signals into an auditable accept/reject record.

pub mod config;
pub mod decision;
pub mod forensics;
pub mod pipeline;
pub mod providers;
pub mod types;

pub use crate::config::{ForensicsThresholds, IvConfig, ValidationPolicy};
pub use crate::decision::{DecisionEngine, DecisionRecord, DecisionStatus, ReasonCode};
pub use crate::forensics::{ForensicsVerdict, Recommendation, SourceForensics, SourceKind};
pub use crate::pipeline::{
    ImageSubmission, MemoryValidationStore, Providers, ValidationPipeline, ValidationStore,
};
pub use crate::types::EvidenceBundle;
