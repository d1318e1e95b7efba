//! Decision engine
//!
//! Fuses an [`EvidenceBundle`] into the final accept/reject record:
//! ordered reason codes, a [0,1] authenticity confidence, and the
//! user-facing message. Pure and total over its inputs: no combination
//! of evidence errors, and identical bundles always yield identical
//! codes, status, score, and message.
//!
//! # Rule model
//! Checks form one ordered trigger list. Every trigger runs (no
//! short-circuiting); firing order fixes the reason-code order and the
//! message sentence order. The final status depends only on whether any
//! critical code fired, never on order. Reordering checks is a data edit
//! on [`TRIGGERS`], not a control-flow change.

pub mod codes;
mod confidence;
pub mod messages;

pub use codes::{CodeClass, ReasonCode};

use crate::config::ValidationPolicy;
use crate::forensics::{Recommendation, SourceKind};
use crate::types::{ContentAssessment, ContentVerdict, EvidenceBundle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Synthetic probability at which corroborated uploads are rejected
const SUSPECTED_AI_MIN_PROBABILITY: f32 = 0.4;
/// Forensics confidence below which an UNKNOWN verdict corroborates
/// an elevated synthetic probability
const SUSPICIOUS_FORENSICS_MAX: f32 = 0.3;
/// Vision confidence that makes a content mismatch decisive
const DECISIVE_MISMATCH_CONFIDENCE: u8 = 95;
/// Vision confidence below which the classifier could not see clearly
const LOW_VISION_CONFIDENCE_MAX: u8 = 50;
/// Vision confidence a scored mismatch needs before it is worth a warning
const SCORED_MISMATCH_MIN: u8 = 60;
/// Forensics confidence needed to flag a forwarded image
const FORWARDED_FLAG_MIN: f32 = 0.7;
/// Forensics confidence needed to flag a screenshot
const SCREENSHOT_FLAG_MIN: f32 = 0.8;
/// Forensics confidence needed to certify an original photo
const ORIGINAL_FLAG_MIN: f32 = 0.7;

/// Final validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Accepted,
    Rejected,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Accepted => "accepted",
            DecisionStatus::Rejected => "rejected",
        }
    }
}

/// The auditable record produced for every validated image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: DecisionStatus,
    /// Codes in firing order; critical ones are present iff rejected
    pub reason_codes: Vec<ReasonCode>,
    /// Authenticity confidence in [0.0, 1.0]
    pub confidence_score: f32,
    /// User-facing sentences for the fired codes
    pub message: String,
    /// The full bundle the decision was made from
    pub evidence: EvidenceBundle,
}

impl DecisionRecord {
    pub fn is_rejected(&self) -> bool {
        self.status == DecisionStatus::Rejected
    }
}

/// Evaluation state visible to triggers that depend on what already fired
struct EvalState {
    rejected: bool,
}

struct TriggerRule {
    name: &'static str,
    check: fn(&EvidenceBundle, &ValidationPolicy, &EvalState) -> Option<ReasonCode>,
}

/// All validation triggers, in firing order
const TRIGGERS: &[TriggerRule] = &[
    TriggerRule {
        name: "ai_generated",
        check: ai_generated,
    },
    TriggerRule {
        name: "suspected_ai_generated",
        check: suspected_ai_generated,
    },
    TriggerRule {
        name: "resubmitted_image",
        check: resubmitted_image,
    },
    TriggerRule {
        name: "missing_exif",
        check: missing_exif,
    },
    TriggerRule {
        name: "location_not_available",
        check: location_not_available,
    },
    TriggerRule {
        name: "location_mismatch",
        check: location_mismatch,
    },
    TriggerRule {
        name: "content_mismatch",
        check: content_mismatch,
    },
    TriggerRule {
        name: "low_vision_confidence",
        check: low_vision_confidence,
    },
    TriggerRule {
        name: "issue_mismatch",
        check: issue_mismatch,
    },
    TriggerRule {
        name: "forwarded_image",
        check: forwarded_image,
    },
    TriggerRule {
        name: "screenshot_detected",
        check: screenshot_detected,
    },
    TriggerRule {
        name: "original_photo",
        check: original_photo,
    },
    TriggerRule {
        name: "forensics_review",
        check: forensics_review,
    },
];

/// Turns evidence bundles into decision records under a fixed policy
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    policy: ValidationPolicy,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

impl DecisionEngine {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Evaluate one evidence bundle
    pub fn evaluate(&self, bundle: EvidenceBundle) -> DecisionRecord {
        let mut reason_codes: Vec<ReasonCode> = Vec::new();
        let mut rejected = false;

        for trigger in TRIGGERS {
            let state = EvalState { rejected };
            if let Some(code) = (trigger.check)(&bundle, &self.policy, &state) {
                rejected = rejected || code.is_critical();
                if reason_codes.contains(&code) {
                    continue;
                }
                match code.class() {
                    CodeClass::Critical => {
                        warn!(check = trigger.name, code = %code, "image rejected")
                    }
                    CodeClass::Warning => {
                        info!(check = trigger.name, code = %code, "validation warning")
                    }
                    CodeClass::Info => {
                        info!(check = trigger.name, code = %code, "validation note")
                    }
                }
                reason_codes.push(code);
            }
        }

        let status = if rejected {
            DecisionStatus::Rejected
        } else {
            DecisionStatus::Accepted
        };
        let confidence_score =
            confidence::score(&bundle, &reason_codes, self.policy.default_allowed_radius_km);
        let message = messages::compose(&reason_codes);

        info!(
            status = status.as_str(),
            codes = reason_codes.len(),
            confidence = confidence_score,
            "validation decided"
        );

        DecisionRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status,
            reason_codes,
            confidence_score,
            message,
            evidence: bundle,
        }
    }
}

// ============================================================================
// Triggers
// ============================================================================

fn ai_generated(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    bundle.ai_flagged().then_some(ReasonCode::AiGenerated)
}

/// Secondary synthetic check: a moderate probability the primary detector
/// did not flag, corroborated by forensics finding nothing recognizable
fn suspected_ai_generated(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    if bundle.ai_flagged() {
        return None;
    }
    let forensics = &bundle.forensics;
    let suspicious = forensics.source == SourceKind::Unknown
        && forensics.confidence_fraction() < SUSPICIOUS_FORENSICS_MAX;
    (suspicious && bundle.ai_probability() >= SUSPECTED_AI_MIN_PROBABILITY)
        .then_some(ReasonCode::SuspectedAiGenerated)
}

fn resubmitted_image(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    bundle.is_duplicate().then_some(ReasonCode::ResubmittedImage)
}

fn missing_exif(
    bundle: &EvidenceBundle,
    policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    (policy.strict_exif && !bundle.has_any_exif()).then_some(ReasonCode::NoExifData)
}

/// Advisory only, and silent when the image was already rejected by an
/// earlier trigger
fn location_not_available(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    state: &EvalState,
) -> Option<ReasonCode> {
    (!state.rejected && !bundle.has_gps()).then_some(ReasonCode::LocationNotAvailable)
}

fn location_mismatch(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let exif = bundle.exif.as_ref()?;
    (exif.has_gps() && exif.location_valid == Some(false)).then_some(ReasonCode::LocationMismatch)
}

/// The scored classifier is near-certain the scene is not a civic issue
/// at all: mismatch verdict, confidence at least 95, and no recognized
/// alternative category
fn is_decisive_mismatch(content: &ContentAssessment) -> bool {
    content.verdict == ContentVerdict::Mismatch
        && content
            .confidence
            .map_or(false, |c| c >= DECISIVE_MISMATCH_CONFIDENCE)
        && content.detected.is_none()
}

fn content_mismatch(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let content = bundle.content_signal()?;
    is_decisive_mismatch(content).then_some(ReasonCode::ImageContentMismatch)
}

fn low_vision_confidence(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let content = bundle.content_signal()?;
    if is_decisive_mismatch(content) {
        return None;
    }
    let low = content
        .confidence
        .map_or(false, |c| c < LOW_VISION_CONFIDENCE_MAX);
    (low && content.verdict != ContentVerdict::Valid).then_some(ReasonCode::LowVisionConfidence)
}

/// Plausible-but-not-decisive disagreement with the declared category.
/// An unscored mismatch (coarse keyword rule) warns unconditionally; a
/// scored one needs at least [`SCORED_MISMATCH_MIN`].
fn issue_mismatch(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let content = bundle.content_signal()?;
    if is_decisive_mismatch(content) {
        return None;
    }
    let low = content
        .confidence
        .map_or(false, |c| c < LOW_VISION_CONFIDENCE_MAX);
    if low && content.verdict != ContentVerdict::Valid {
        return None;
    }
    if content.verdict != ContentVerdict::Mismatch {
        return None;
    }
    match content.confidence {
        None => Some(ReasonCode::ImageIssueMismatch),
        Some(c) if c >= SCORED_MISMATCH_MIN => Some(ReasonCode::ImageIssueMismatch),
        Some(_) => None,
    }
}

fn forwarded_image(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let forensics = &bundle.forensics;
    (forensics.source == SourceKind::Whatsapp
        && forensics.confidence_fraction() >= FORWARDED_FLAG_MIN)
        .then_some(ReasonCode::WhatsappForwardedImage)
}

fn screenshot_detected(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let forensics = &bundle.forensics;
    (forensics.source == SourceKind::Screenshot
        && forensics.confidence_fraction() >= SCREENSHOT_FLAG_MIN)
        .then_some(ReasonCode::ScreenshotDetected)
}

fn original_photo(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    let forensics = &bundle.forensics;
    (forensics.source == SourceKind::OriginalPhoto
        && forensics.confidence_fraction() >= ORIGINAL_FLAG_MIN)
        .then_some(ReasonCode::OriginalPhotoVerified)
}

fn forensics_review(
    bundle: &EvidenceBundle,
    _policy: &ValidationPolicy,
    _state: &EvalState,
) -> Option<ReasonCode> {
    (bundle.forensics.recommendation == Recommendation::Review)
        .then_some(ReasonCode::ForensicsReviewRequired)
}
