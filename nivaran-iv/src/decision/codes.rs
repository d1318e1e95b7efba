//! Reason codes and their severity classes
//!
//! A code's class is intrinsic, not contextual: critical codes force
//! rejection whenever they fire, warnings lower confidence, info codes
//! annotate the record without penalizing the submitter.

use serde::{Deserialize, Serialize};

/// Severity class of a reason code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeClass {
    /// Firing forces rejection
    Critical,
    /// Lowers confidence, never rejects
    Warning,
    /// Annotation only
    Info,
}

/// Why a validation check fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// The AI detector flagged the image as synthetic
    AiGenerated,
    /// Elevated synthetic probability corroborated by absent forensics
    SuspectedAiGenerated,
    /// Perceptual-hash match against an earlier submission
    ResubmittedImage,
    /// Strict mode: no GPS, no timestamp, no camera make at all
    NoExifData,
    /// The classifier is highly confident the scene contradicts the
    /// declared category
    ImageContentMismatch,
    /// The image carries no GPS position
    LocationNotAvailable,
    /// Embedded GPS sits outside the allowed radius of the declared
    /// location
    LocationMismatch,
    /// The scene plausibly contradicts the declared category
    ImageIssueMismatch,
    /// The content classifier could not see the image clearly
    LowVisionConfidence,
    /// The source classifier asked for a manual look
    ForensicsReviewRequired,
    /// Messenger-forwarded image accepted with a caveat
    WhatsappForwardedImage,
    /// Screen capture accepted with a caveat
    ScreenshotDetected,
    /// Original capture with full metadata; earns a confidence boost
    OriginalPhotoVerified,
}

impl ReasonCode {
    pub fn class(&self) -> CodeClass {
        match self {
            ReasonCode::AiGenerated
            | ReasonCode::SuspectedAiGenerated
            | ReasonCode::ResubmittedImage
            | ReasonCode::NoExifData
            | ReasonCode::ImageContentMismatch => CodeClass::Critical,
            ReasonCode::LocationNotAvailable
            | ReasonCode::LocationMismatch
            | ReasonCode::ImageIssueMismatch
            | ReasonCode::LowVisionConfidence
            | ReasonCode::ForensicsReviewRequired => CodeClass::Warning,
            ReasonCode::WhatsappForwardedImage
            | ReasonCode::ScreenshotDetected
            | ReasonCode::OriginalPhotoVerified => CodeClass::Info,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.class() == CodeClass::Critical
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::AiGenerated => "AI_GENERATED",
            ReasonCode::SuspectedAiGenerated => "SUSPECTED_AI_GENERATED",
            ReasonCode::ResubmittedImage => "RESUBMITTED_IMAGE",
            ReasonCode::NoExifData => "NO_EXIF_DATA",
            ReasonCode::ImageContentMismatch => "IMAGE_CONTENT_MISMATCH",
            ReasonCode::LocationNotAvailable => "LOCATION_NOT_AVAILABLE",
            ReasonCode::LocationMismatch => "LOCATION_MISMATCH",
            ReasonCode::ImageIssueMismatch => "IMAGE_ISSUE_MISMATCH",
            ReasonCode::LowVisionConfidence => "LOW_VISION_CONFIDENCE",
            ReasonCode::ForensicsReviewRequired => "FORENSICS_REVIEW_REQUIRED",
            ReasonCode::WhatsappForwardedImage => "WHATSAPP_FORWARDED_IMAGE",
            ReasonCode::ScreenshotDetected => "SCREENSHOT_DETECTED",
            ReasonCode::OriginalPhotoVerified => "ORIGINAL_PHOTO_VERIFIED",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
