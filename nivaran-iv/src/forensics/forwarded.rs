//! Forwarded / messenger-recompressed image detection
//!
//! A WhatsApp hop recompresses the JPEG into a narrow size and quality
//! band, strips EXIF and the ICC profile, snaps dimensions to a small set
//! of resize targets, and often leaves its naming convention on the file.
//! No single artifact is conclusive; the gate requires several before the
//! detector may claim the image.

use super::probe::{ImageFormatKind, ImageProbe};
use super::rules::{self, MarkerHit, MarkerRule};
use super::{DetectorReport, SourceKind};
use crate::config::ForensicsThresholds;
use crate::types::ExifStatus;

const RULES: &[MarkerRule] = &[
    MarkerRule {
        name: "jpeg_signature",
        strong: false,
        check: jpeg_signature,
    },
    MarkerRule {
        name: "file_size",
        strong: false,
        check: file_size,
    },
    MarkerRule {
        name: "phone_aspect_ratio",
        strong: false,
        check: phone_aspect_ratio,
    },
    MarkerRule {
        name: "resize_pattern",
        strong: false,
        check: resize_pattern,
    },
    MarkerRule {
        name: "icc_missing",
        strong: false,
        check: icc_missing,
    },
    MarkerRule {
        name: "exif_stripped",
        strong: false,
        check: exif_stripped,
    },
    MarkerRule {
        name: "compression_quality",
        strong: false,
        check: compression_quality,
    },
    MarkerRule {
        name: "filename_pattern",
        strong: false,
        check: filename_pattern,
    },
];

pub(crate) fn detect(probe: &ImageProbe, thresholds: &ForensicsThresholds) -> DetectorReport {
    let outcome = rules::evaluate(RULES, probe);
    if outcome.active_count() >= thresholds.forwarded_min_markers {
        DetectorReport::claimed(SourceKind::Whatsapp, outcome)
    } else {
        let note = format!(
            "Only {}/{} required markers found",
            outcome.active_count(),
            thresholds.forwarded_min_markers
        );
        DetectorReport::unclaimed(outcome, note)
    }
}

fn jpeg_signature(probe: &ImageProbe) -> Option<MarkerHit> {
    if probe.format == ImageFormatKind::Jpeg {
        Some(MarkerHit::new(15, "JPEG signature detected"))
    } else {
        None
    }
}

fn file_size(probe: &ImageProbe) -> Option<MarkerHit> {
    let (lo, hi) = rules::FORWARDED_SIZE_RANGE;
    if (lo..=hi).contains(&probe.byte_len) {
        Some(MarkerHit::new(
            20,
            format!(
                "File size in WhatsApp range ({:.0}KB)",
                probe.byte_len as f64 / 1024.0
            ),
        ))
    } else {
        None
    }
}

fn phone_aspect_ratio(probe: &ImageProbe) -> Option<MarkerHit> {
    let (w, h) = probe.dimensions?;
    let reduced = rules::reduced_aspect(w, h);
    if rules::PHONE_ASPECT_RATIOS.contains(&reduced) {
        Some(MarkerHit::new(
            15,
            format!("Phone aspect ratio {}:{}", reduced.0, reduced.1),
        ))
    } else {
        None
    }
}

fn resize_pattern(probe: &ImageProbe) -> Option<MarkerHit> {
    let (w, h) = probe.dimensions?;
    if rules::matches_resize_target(w, h) {
        Some(MarkerHit::new(
            10,
            format!("WhatsApp resize pattern detected ({w}x{h})"),
        ))
    } else {
        None
    }
}

fn icc_missing(probe: &ImageProbe) -> Option<MarkerHit> {
    if !probe.icc_present {
        Some(MarkerHit::new(10, "ICC color profile missing"))
    } else {
        None
    }
}

/// Metadata loss: a messenger hop drops camera identification even when it
/// leaves a nominal EXIF shell behind
fn exif_stripped(probe: &ImageProbe) -> Option<MarkerHit> {
    match probe.exif.status {
        ExifStatus::Present => {
            let has_camera =
                probe.exif.camera_make.is_some() && probe.exif.camera_model.is_some();
            if !has_camera || !probe.exif.has_camera_ifd {
                Some(MarkerHit::new(20, "EXIF data stripped or camera info missing"))
            } else {
                None
            }
        }
        ExifStatus::Absent | ExifStatus::Unreadable => {
            Some(MarkerHit::new(25, "EXIF data completely stripped"))
        }
    }
}

fn compression_quality(probe: &ImageProbe) -> Option<MarkerHit> {
    let (lo, hi) = rules::FORWARDED_QUALITY_RANGE;
    if probe.format == ImageFormatKind::Jpeg && (lo..=hi).contains(&probe.quality) {
        Some(MarkerHit::new(
            15,
            format!("JPEG quality in WhatsApp range ({}%)", probe.quality),
        ))
    } else {
        None
    }
}

fn filename_pattern(probe: &ImageProbe) -> Option<MarkerHit> {
    let pattern = rules::match_name_pattern(&rules::FORWARDED_NAME_PATTERNS, &probe.filename)?;
    Some(MarkerHit::new(
        20,
        format!("WhatsApp filename pattern: {pattern}"),
    ))
}
