//! Core evidence types for image validation
//!
//! Every analysis signal is normalized into one of the evidence structs
//! below before the decision engine sees it. A missing or failed signal is
//! represented as an absent field in [`EvidenceBundle`], never as an error:
//! the engine substitutes permissive defaults so a partial outage narrows
//! the checks instead of failing the validation.

use crate::forensics::ForensicsVerdict;
use nivaran_common::{Coordinates, IssueCategory, ReportId, Severity};
use serde::{Deserialize, Serialize};

// ============================================================================
// AI Generation Evidence
// ============================================================================

/// Verdict from an AI-generation detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    /// Probability the image is synthetic (0.0-1.0)
    pub probability: f32,
    /// Provider-side flag; forces rejection when set
    pub is_flagged: bool,
    /// Set when the provider was configured off rather than consulted
    #[serde(default)]
    pub skipped: bool,
}

impl AiAssessment {
    /// Neutral assessment reported by a disabled provider
    pub fn skipped() -> Self {
        Self {
            probability: 0.0,
            is_flagged: false,
            skipped: true,
        }
    }
}

// ============================================================================
// EXIF / Location Evidence
// ============================================================================

/// Whether an EXIF block was found and parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExifStatus {
    /// An EXIF block was found and parsed
    Present,
    /// The image carries no EXIF block at all
    Absent,
    /// An EXIF block exists but could not be parsed
    Unreadable,
}

/// EXIF-derived location and camera evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExifEvidence {
    pub status: ExifStatus,
    /// GPS position embedded in the image, decimal degrees
    pub gps: Option<Coordinates>,
    /// Capture timestamp as recorded by the camera
    pub timestamp: Option<String>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    /// Distance between embedded GPS and the declared report location, km
    pub distance_km: Option<f32>,
    /// Radius the resolver validated against, km
    pub allowed_radius_km: Option<f32>,
    /// Whether the embedded GPS falls within the allowed radius.
    /// `None` when no comparison was possible.
    pub location_valid: Option<bool>,
}

impl ExifEvidence {
    /// Evidence for an image with no EXIF block
    pub fn absent() -> Self {
        Self {
            status: ExifStatus::Absent,
            gps: None,
            timestamp: None,
            camera_make: None,
            camera_model: None,
            distance_km: None,
            allowed_radius_km: None,
            location_valid: None,
        }
    }

    /// Evidence for an image whose EXIF block failed to parse
    pub fn unreadable() -> Self {
        Self {
            status: ExifStatus::Unreadable,
            ..Self::absent()
        }
    }

    pub fn has_gps(&self) -> bool {
        self.gps.is_some()
    }
}

// ============================================================================
// Duplicate Evidence
// ============================================================================

/// One ranked hit from the perceptual-hash index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Report the matching image was originally submitted under
    pub report_id: ReportId,
    /// Perceptual similarity (0.0-1.0)
    pub similarity: f32,
}

/// Resubmission verdict distilled from the ranked index hits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateEvidence {
    /// Best-match similarity cleared the configured threshold
    pub is_duplicate: bool,
    /// Similarity of the best match (0.0 when the index returned nothing)
    pub similarity: f32,
    /// Report that holds the matching image
    pub matched_report: Option<ReportId>,
}

impl DuplicateEvidence {
    /// Evidence for an image with no index hits
    pub fn no_match() -> Self {
        Self {
            is_duplicate: false,
            similarity: 0.0,
            matched_report: None,
        }
    }
}

// ============================================================================
// Content Evidence
// ============================================================================

/// Whether the image content agrees with the declared issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentVerdict {
    /// Content matches the declared category
    Valid,
    /// Content contradicts the declared category
    Mismatch,
    /// The classifier could not commit either way
    Uncertain,
}

/// Verdict from the scene/content classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAssessment {
    pub verdict: ContentVerdict,
    /// Category the classifier actually saw, when it recognized one
    pub detected: Option<IssueCategory>,
    /// Classifier confidence (0-100). `None` means the mismatch came from
    /// a coarse rule rather than a scored model.
    pub confidence: Option<u8>,
    /// Issue severity estimated from the image, when available
    pub severity: Option<Severity>,
    /// Set when the provider was configured off rather than consulted
    #[serde(default)]
    pub skipped: bool,
}

impl ContentAssessment {
    /// Neutral assessment reported by a disabled provider
    pub fn skipped() -> Self {
        Self {
            verdict: ContentVerdict::Uncertain,
            detected: None,
            confidence: None,
            severity: None,
            skipped: true,
        }
    }
}

// ============================================================================
// Evidence Bundle
// ============================================================================

/// Everything the decision engine knows about one submitted image
///
/// Optional fields are signals that were unavailable, disabled, or failed;
/// the forensics verdict is always present because it is computed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub ai: Option<AiAssessment>,
    pub exif: Option<ExifEvidence>,
    pub duplicate: Option<DuplicateEvidence>,
    pub content: Option<ContentAssessment>,
    pub forensics: ForensicsVerdict,
}

impl EvidenceBundle {
    /// Bundle with no external signals, only a forensics verdict
    pub fn from_forensics(forensics: ForensicsVerdict) -> Self {
        Self {
            ai: None,
            exif: None,
            duplicate: None,
            content: None,
            forensics,
        }
    }

    /// AI-generation probability, 0.0 when the signal is absent or skipped
    pub fn ai_probability(&self) -> f32 {
        self.ai
            .as_ref()
            .filter(|a| !a.skipped)
            .map(|a| a.probability)
            .unwrap_or(0.0)
    }

    pub fn ai_flagged(&self) -> bool {
        self.ai.as_ref().map(|a| a.is_flagged).unwrap_or(false)
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate
            .as_ref()
            .map(|d| d.is_duplicate)
            .unwrap_or(false)
    }

    pub fn has_gps(&self) -> bool {
        self.exif.as_ref().map(|e| e.has_gps()).unwrap_or(false)
    }

    /// Any of the metadata fields strict mode insists on: GPS, capture
    /// timestamp, or camera make
    pub fn has_any_exif(&self) -> bool {
        self.exif
            .as_ref()
            .map(|e| e.has_gps() || e.timestamp.is_some() || e.camera_make.is_some())
            .unwrap_or(false)
    }

    /// Content assessment, ignoring a skipped provider
    pub fn content_signal(&self) -> Option<&ContentAssessment> {
        self.content.as_ref().filter(|c| !c.skipped)
    }
}
