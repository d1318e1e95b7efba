//! Original camera-capture detection
//!
//! An unmodified phone or camera photo keeps what every relay strips:
//! full-resolution pixels, light compression, sensor grain, and a rich
//! EXIF block naming the device, the exposure, the capture time, and the
//! position. The gate counts only the strong markers, the ones a
//! determined spoofer would have to fabricate together, before claiming
//! ORIGINAL_PHOTO.

use super::probe::{ImageFormatKind, ImageProbe};
use super::rules::{self, MarkerHit, MarkerRule};
use super::{DetectorReport, SourceKind};
use crate::config::ForensicsThresholds;

const RULES: &[MarkerRule] = &[
    MarkerRule {
        name: "high_resolution",
        strong: true,
        check: high_resolution,
    },
    MarkerRule {
        name: "high_jpeg_quality",
        strong: true,
        check: high_jpeg_quality,
    },
    MarkerRule {
        name: "sensor_noise",
        strong: false,
        check: sensor_noise,
    },
    MarkerRule {
        name: "full_exif",
        strong: true,
        check: full_exif,
    },
    MarkerRule {
        name: "camera_make_model",
        strong: true,
        check: camera_make_model,
    },
    MarkerRule {
        name: "original_timestamp",
        strong: false,
        check: original_timestamp,
    },
    MarkerRule {
        name: "gps_coordinates",
        strong: true,
        check: gps_coordinates,
    },
    MarkerRule {
        name: "camera_settings",
        strong: false,
        check: camera_settings,
    },
];

pub(crate) fn detect(probe: &ImageProbe, thresholds: &ForensicsThresholds) -> DetectorReport {
    let outcome = rules::evaluate(RULES, probe);
    if outcome.strong_active >= thresholds.original_min_strong_markers {
        DetectorReport::claimed(SourceKind::OriginalPhoto, outcome)
    } else {
        let note = format!(
            "Only {}/{} strong markers found",
            outcome.strong_active, thresholds.original_min_strong_markers
        );
        DetectorReport::unclaimed(outcome, note)
    }
}

fn high_resolution(probe: &ImageProbe) -> Option<MarkerHit> {
    let (w, h) = probe.dimensions?;
    if w.max(h) >= rules::HIGH_RESOLUTION_MIN_EDGE {
        Some(MarkerHit::new(
            25,
            format!("High resolution detected ({w}x{h})"),
        ))
    } else {
        None
    }
}

fn high_jpeg_quality(probe: &ImageProbe) -> Option<MarkerHit> {
    if probe.format == ImageFormatKind::Jpeg && probe.quality > rules::HIGH_QUALITY_MIN {
        Some(MarkerHit::new(
            20,
            format!("High JPEG quality ({}%)", probe.quality),
        ))
    } else {
        None
    }
}

fn sensor_noise(probe: &ImageProbe) -> Option<MarkerHit> {
    let ratio = probe.pixels.as_ref()?.noise_ratio?;
    let (lo, hi) = rules::SENSOR_NOISE_RANGE;
    if (lo..=hi).contains(&ratio) {
        Some(MarkerHit::new(15, "Camera sensor noise pattern detected"))
    } else {
        None
    }
}

fn full_exif(probe: &ImageProbe) -> Option<MarkerHit> {
    if probe.exif.section_count >= rules::MIN_EXIF_SECTIONS {
        Some(MarkerHit::new(
            20,
            format!("Full EXIF data present ({} sections)", probe.exif.section_count),
        ))
    } else {
        None
    }
}

/// Make must name a recognized manufacturer; a bare model string alone is
/// too easy to forge
fn camera_make_model(probe: &ImageProbe) -> Option<MarkerHit> {
    let make = probe.exif.camera_make.as_deref()?;
    let model = probe.exif.camera_model.as_deref()?;
    let make_lower = make.to_lowercase();
    if rules::CAMERA_BRANDS
        .iter()
        .any(|brand| make_lower.contains(&brand.to_lowercase()))
    {
        Some(MarkerHit::new(
            25,
            format!("Camera detected: {make} {model}"),
        ))
    } else {
        None
    }
}

fn original_timestamp(probe: &ImageProbe) -> Option<MarkerHit> {
    probe
        .exif
        .timestamp
        .as_ref()
        .map(|_| MarkerHit::new(10, "Original timestamp present"))
}

fn gps_coordinates(probe: &ImageProbe) -> Option<MarkerHit> {
    probe
        .exif
        .gps
        .as_ref()
        .map(|_| MarkerHit::new(20, "GPS coordinates present"))
}

fn camera_settings(probe: &ImageProbe) -> Option<MarkerHit> {
    if probe.exif.setting_count >= rules::MIN_CAMERA_SETTINGS {
        Some(MarkerHit::new(
            15,
            format!(
                "Camera settings present ({} parameters)",
                probe.exif.setting_count
            ),
        ))
    } else {
        None
    }
}
