//! Authenticity confidence scoring
//!
//! Starts at 1.0 and applies one independent deduction per fired code, in
//! a fixed order, then clamps to [0.0, 1.0]. Deductions never cascade or
//! short-circuit: the same codes over the same evidence always produce
//! the same score. Magnitudes are calibrated against field data; treat
//! them as a set, not individually tunable numbers.

use super::codes::ReasonCode;
use crate::forensics::SourceKind;
use crate::types::EvidenceBundle;

/// Synthetic probability assumed when the AI detector gave no number
const DEFAULT_AI_PROBABILITY: f32 = 0.8;
/// Similarity assumed when the duplicate index gave no number
const DEFAULT_SIMILARITY: f32 = 1.0;
/// Vision confidence (percent) assumed when the classifier gave no number
const DEFAULT_VISION_CONFIDENCE: f32 = 70.0;

/// Score one decision, given the codes that fired
pub(crate) fn score(
    bundle: &EvidenceBundle,
    codes: &[ReasonCode],
    default_allowed_radius_km: f32,
) -> f32 {
    let fired = |code: ReasonCode| codes.contains(&code);
    let mut score = 1.0f32;

    if fired(ReasonCode::AiGenerated) {
        let probability = bundle
            .ai
            .as_ref()
            .map(|a| a.probability)
            .unwrap_or(DEFAULT_AI_PROBABILITY);
        score -= probability;
    }

    if fired(ReasonCode::ResubmittedImage) {
        let similarity = bundle
            .duplicate
            .as_ref()
            .map(|d| d.similarity)
            .unwrap_or(DEFAULT_SIMILARITY);
        score -= 0.7 * similarity;
    }

    if fired(ReasonCode::NoExifData) {
        score -= 0.9;
    }

    if fired(ReasonCode::LocationNotAvailable) {
        score -= 0.15;
    }

    if fired(ReasonCode::LocationMismatch) {
        // scale with how far outside the radius the photo was taken,
        // capped so distance alone cannot dominate the score
        let exif = bundle.exif.as_ref();
        let distance = exif.and_then(|e| e.distance_km);
        let allowed = exif
            .and_then(|e| e.allowed_radius_km)
            .unwrap_or(default_allowed_radius_km);
        match distance {
            Some(d) if allowed > 0.0 => score -= (0.25f32).min((d / allowed) * 0.1),
            _ => score -= 0.15,
        }
    }

    if fired(ReasonCode::ImageIssueMismatch) {
        score -= 0.10;
    }

    if fired(ReasonCode::ImageContentMismatch) {
        let vision = bundle
            .content
            .as_ref()
            .and_then(|c| c.confidence)
            .map(f32::from)
            .unwrap_or(DEFAULT_VISION_CONFIDENCE);
        score -= 0.6 * (vision / 100.0);
    }

    if fired(ReasonCode::LowVisionConfidence) {
        score -= 0.15;
    }

    // Forensics adjustments: the only positive term in the model
    let forensics = &bundle.forensics;
    if fired(ReasonCode::OriginalPhotoVerified)
        && forensics.source == SourceKind::OriginalPhoto
        && forensics.confidence_fraction() >= 0.7
    {
        score += 0.15 * forensics.confidence_fraction();
    }
    if fired(ReasonCode::WhatsappForwardedImage) {
        score -= 0.05;
    }
    if fired(ReasonCode::ScreenshotDetected) {
        score -= 0.08;
    }
    if fired(ReasonCode::ForensicsReviewRequired) {
        score -= 0.12;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forensics::{ForensicsVerdict, Recommendation, SourceKind};
    use crate::types::{AiAssessment, ContentAssessment, ContentVerdict, DuplicateEvidence};

    fn bundle() -> EvidenceBundle {
        EvidenceBundle::from_forensics(ForensicsVerdict::unknown(Vec::new()))
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn no_codes_scores_full_confidence() {
        assert_close(score(&bundle(), &[], 10.0), 1.0);
    }

    #[test]
    fn ai_deduction_uses_reported_probability() {
        let mut b = bundle();
        b.ai = Some(AiAssessment {
            probability: 0.92,
            is_flagged: true,
            skipped: false,
        });
        let s = score(&b, &[ReasonCode::AiGenerated], 10.0);
        assert_close(s, 1.0 - 0.92);
    }

    #[test]
    fn ai_deduction_defaults_without_a_number() {
        let s = score(&bundle(), &[ReasonCode::AiGenerated], 10.0);
        assert_close(s, 1.0 - 0.8);
    }

    #[test]
    fn suspected_ai_deducts_nothing() {
        // the critical status and message carry the weight instead
        let s = score(&bundle(), &[ReasonCode::SuspectedAiGenerated], 10.0);
        assert_close(s, 1.0);
    }

    #[test]
    fn duplicate_deduction_scales_with_similarity() {
        let mut b = bundle();
        b.duplicate = Some(DuplicateEvidence {
            is_duplicate: true,
            similarity: 0.96,
            matched_report: None,
        });
        let s = score(&b, &[ReasonCode::ResubmittedImage], 10.0);
        assert_close(s, 1.0 - 0.7 * 0.96);
    }

    #[test]
    fn missing_exif_near_zeroes_the_score() {
        let s = score(&bundle(), &[ReasonCode::NoExifData], 10.0);
        assert_close(s, 0.1);
    }

    #[test]
    fn location_mismatch_scales_with_distance() {
        let mut b = bundle();
        let mut exif = crate::types::ExifEvidence::absent();
        exif.distance_km = Some(12.0);
        exif.allowed_radius_km = Some(10.0);
        b.exif = Some(exif);
        let s = score(&b, &[ReasonCode::LocationMismatch], 10.0);
        assert_close(s, 1.0 - 0.12);
    }

    #[test]
    fn location_mismatch_deduction_is_capped() {
        let mut b = bundle();
        let mut exif = crate::types::ExifEvidence::absent();
        exif.distance_km = Some(500.0);
        exif.allowed_radius_km = Some(10.0);
        b.exif = Some(exif);
        let s = score(&b, &[ReasonCode::LocationMismatch], 10.0);
        assert_close(s, 0.75);
    }

    #[test]
    fn location_mismatch_without_distance_uses_flat_deduction() {
        let s = score(&bundle(), &[ReasonCode::LocationMismatch], 10.0);
        assert_close(s, 0.85);
    }

    #[test]
    fn content_mismatch_scales_with_vision_confidence() {
        let mut b = bundle();
        b.content = Some(ContentAssessment {
            verdict: ContentVerdict::Mismatch,
            detected: None,
            confidence: Some(95),
            severity: None,
            skipped: false,
        });
        let s = score(&b, &[ReasonCode::ImageContentMismatch], 10.0);
        assert_close(s, 1.0 - 0.6 * 0.95);
    }

    #[test]
    fn original_photo_boost_requires_high_forensics_confidence() {
        let mut b = bundle();
        b.forensics = ForensicsVerdict {
            source: SourceKind::OriginalPhoto,
            confidence: 80,
            evidence: Vec::new(),
            recommendation: Recommendation::Accept,
            breakdown: Vec::new(),
        };
        let s = score(&b, &[ReasonCode::OriginalPhotoVerified], 10.0);
        assert_close(s, 1.0); // 1.0 + 0.12 clamps back down

        b.forensics.confidence = 60;
        let s = score(&b, &[ReasonCode::OriginalPhotoVerified], 10.0);
        assert_close(s, 1.0); // below 0.7: no boost, nothing to clamp
    }

    #[test]
    fn original_photo_boost_offsets_warnings() {
        let mut b = bundle();
        b.forensics = ForensicsVerdict {
            source: SourceKind::OriginalPhoto,
            confidence: 80,
            evidence: Vec::new(),
            recommendation: Recommendation::Accept,
            breakdown: Vec::new(),
        };
        let codes = [
            ReasonCode::LocationNotAvailable,
            ReasonCode::OriginalPhotoVerified,
        ];
        let s = score(&b, &codes, 10.0);
        assert_close(s, 1.0 - 0.15 + 0.15 * 0.8);
    }

    #[test]
    fn forwarded_and_screenshot_carry_small_deductions() {
        let s = score(&bundle(), &[ReasonCode::WhatsappForwardedImage], 10.0);
        assert_close(s, 0.95);
        let s = score(&bundle(), &[ReasonCode::ScreenshotDetected], 10.0);
        assert_close(s, 0.92);
        let s = score(&bundle(), &[ReasonCode::ForensicsReviewRequired], 10.0);
        assert_close(s, 0.88);
    }

    #[test]
    fn stacked_deductions_clamp_at_zero() {
        let codes = [
            ReasonCode::AiGenerated,
            ReasonCode::ResubmittedImage,
            ReasonCode::NoExifData,
            ReasonCode::LocationNotAvailable,
            ReasonCode::LowVisionConfidence,
        ];
        let s = score(&bundle(), &codes, 10.0);
        assert_close(s, 0.0);
    }

    #[test]
    fn every_code_subset_stays_in_unit_range() {
        const ALL: [ReasonCode; 13] = [
            ReasonCode::AiGenerated,
            ReasonCode::SuspectedAiGenerated,
            ReasonCode::ResubmittedImage,
            ReasonCode::NoExifData,
            ReasonCode::ImageContentMismatch,
            ReasonCode::LocationNotAvailable,
            ReasonCode::LocationMismatch,
            ReasonCode::ImageIssueMismatch,
            ReasonCode::LowVisionConfidence,
            ReasonCode::ForensicsReviewRequired,
            ReasonCode::WhatsappForwardedImage,
            ReasonCode::ScreenshotDetected,
            ReasonCode::OriginalPhotoVerified,
        ];
        let b = bundle();
        for mask in 0u16..(1 << ALL.len()) {
            let subset: Vec<ReasonCode> = ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect();
            let s = score(&b, &subset, 10.0);
            assert!((0.0..=1.0).contains(&s), "subset {mask:#b} scored {s}");
        }
    }
}
