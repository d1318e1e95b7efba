//! Signal-provider contracts
//!
//! Each external analysis service sits behind an object-safe async trait
//! so the pipeline can be wired against network-backed implementations,
//! local fallbacks, or test doubles interchangeably. Two families ship
//! with the crate:
//!
//! - `Disabled*`: neutral results for deployments that switch a provider
//!   off; the engine's permissive defaults take over.
//! - [`LocalExifResolver`]: a full resolver that needs no network; EXIF
//!   parsing and the declared-location distance check are both local
//!   computations.

use crate::forensics::probe;
use crate::types::{AiAssessment, ContentAssessment, DuplicateMatch, ExifEvidence, ExifStatus};
use nivaran_common::{Coordinates, IssueCategory};
use thiserror::Error;

/// Failure surfaced by a signal provider
///
/// The pipeline logs these and degrades to absent evidence; they never
/// fail a validation on their own.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider returned malformed data: {0}")]
    Malformed(String),
}

/// Detects synthetically generated imagery
#[async_trait::async_trait]
pub trait AiImageDetector: Send + Sync {
    /// Provider name for logs and provenance
    fn name(&self) -> &'static str;

    async fn assess(&self, image: &[u8]) -> Result<AiAssessment, ProviderError>;
}

/// Extracts EXIF facts and checks the embedded GPS against the declared
/// report location
#[async_trait::async_trait]
pub trait ExifLocationResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// `declared` is the location the citizen reported; `None` skips the
    /// distance comparison and leaves `location_valid` unset.
    async fn resolve(
        &self,
        image: &[u8],
        declared: Option<&Coordinates>,
    ) -> Result<ExifEvidence, ProviderError>;
}

/// Perceptual-hash index over previously submitted images
#[async_trait::async_trait]
pub trait DuplicateIndex: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ranked matches, best first; an empty vec means no hit at all
    async fn lookup(&self, image: &[u8]) -> Result<Vec<DuplicateMatch>, ProviderError>;
}

/// Judges whether the scene agrees with the declared issue category
#[async_trait::async_trait]
pub trait ContentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        image: &[u8],
        declared: IssueCategory,
    ) -> Result<ContentAssessment, ProviderError>;
}

// ============================================================================
// Null implementations
// ============================================================================

/// Reports every image as not-AI without looking at it
pub struct DisabledAiDetector;

#[async_trait::async_trait]
impl AiImageDetector for DisabledAiDetector {
    fn name(&self) -> &'static str {
        "ai-detector-disabled"
    }

    async fn assess(&self, _image: &[u8]) -> Result<AiAssessment, ProviderError> {
        Ok(AiAssessment::skipped())
    }
}

/// Reports absent EXIF without looking at the image
pub struct DisabledExifResolver;

#[async_trait::async_trait]
impl ExifLocationResolver for DisabledExifResolver {
    fn name(&self) -> &'static str {
        "exif-resolver-disabled"
    }

    async fn resolve(
        &self,
        _image: &[u8],
        _declared: Option<&Coordinates>,
    ) -> Result<ExifEvidence, ProviderError> {
        Ok(ExifEvidence::absent())
    }
}

/// Never finds a duplicate
pub struct DisabledDuplicateIndex;

#[async_trait::async_trait]
impl DuplicateIndex for DisabledDuplicateIndex {
    fn name(&self) -> &'static str {
        "duplicate-index-disabled"
    }

    async fn lookup(&self, _image: &[u8]) -> Result<Vec<DuplicateMatch>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Declines to judge content either way
pub struct DisabledContentClassifier;

#[async_trait::async_trait]
impl ContentClassifier for DisabledContentClassifier {
    fn name(&self) -> &'static str {
        "content-classifier-disabled"
    }

    async fn classify(
        &self,
        _image: &[u8],
        _declared: IssueCategory,
    ) -> Result<ContentAssessment, ProviderError> {
        Ok(ContentAssessment::skipped())
    }
}

// ============================================================================
// Local EXIF resolver
// ============================================================================

/// EXIF resolver with no external dependencies
///
/// Parses the EXIF block from the submitted bytes and, when both an
/// embedded GPS position and a declared location exist, validates the
/// great-circle distance between them against the allowed radius.
pub struct LocalExifResolver {
    allowed_radius_km: f32,
}

impl LocalExifResolver {
    pub fn new(allowed_radius_km: f32) -> Self {
        Self { allowed_radius_km }
    }
}

#[async_trait::async_trait]
impl ExifLocationResolver for LocalExifResolver {
    fn name(&self) -> &'static str {
        "exif-local"
    }

    async fn resolve(
        &self,
        image: &[u8],
        declared: Option<&Coordinates>,
    ) -> Result<ExifEvidence, ProviderError> {
        let parsed = probe::read_exif(image);
        let mut evidence = match parsed.status {
            ExifStatus::Absent => ExifEvidence::absent(),
            ExifStatus::Unreadable => ExifEvidence::unreadable(),
            ExifStatus::Present => ExifEvidence {
                status: ExifStatus::Present,
                gps: parsed.gps,
                timestamp: parsed.timestamp,
                camera_make: parsed.camera_make,
                camera_model: parsed.camera_model,
                distance_km: None,
                allowed_radius_km: None,
                location_valid: None,
            },
        };

        if let (Some(gps), Some(declared)) = (evidence.gps, declared) {
            let distance = haversine_km(&gps, declared);
            evidence.distance_km = Some(distance);
            evidence.allowed_radius_km = Some(self.allowed_radius_km);
            evidence.location_valid = Some(distance <= self.allowed_radius_km);
        }
        Ok(evidence)
    }
}

/// Great-circle distance between two positions, km
fn haversine_km(a: &Coordinates, b: &Coordinates) -> f32 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    (2.0 * EARTH_RADIUS_KM * h.sqrt().asin()) as f32
}
