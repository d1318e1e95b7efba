//! Screen-capture detection
//!
//! Screenshots are rendered, not photographed: lossless or near-lossless
//! encoding, dimensions equal to a device panel, hard pixel edges, UI
//! chrome at the frame borders, and no camera metadata. The PNG +
//! exact-screen-resolution pair is decisive on its own and bypasses the
//! marker-count gate with a floor confidence.

use super::probe::{ImageFormatKind, ImageProbe};
use super::rules::{self, MarkerHit, MarkerRule};
use super::{DetectorReport, SourceKind};
use crate::config::ForensicsThresholds;
use crate::types::ExifStatus;

/// Confidence floor applied when the PNG + exact-resolution pair holds
const DECISIVE_PAIR_FLOOR: u32 = 85;

const RULES: &[MarkerRule] = &[
    MarkerRule {
        name: "png_format",
        strong: false,
        check: png_format,
    },
    MarkerRule {
        name: "exact_screen_resolution",
        strong: false,
        check: exact_screen_resolution,
    },
    MarkerRule {
        name: "lossless_compression",
        strong: false,
        check: lossless_compression,
    },
    MarkerRule {
        name: "ui_color_patterns",
        strong: false,
        check: ui_color_patterns,
    },
    MarkerRule {
        name: "pixel_perfect_edges",
        strong: false,
        check: pixel_perfect_edges,
    },
    MarkerRule {
        name: "os_metadata",
        strong: false,
        check: os_metadata,
    },
    MarkerRule {
        name: "no_camera_metadata",
        strong: false,
        check: no_camera_metadata,
    },
    MarkerRule {
        name: "filename_pattern",
        strong: false,
        check: filename_pattern,
    },
];

pub(crate) fn detect(probe: &ImageProbe, thresholds: &ForensicsThresholds) -> DetectorReport {
    let mut outcome = rules::evaluate(RULES, probe);
    let decisive_pair =
        outcome.is_active("png_format") && outcome.is_active("exact_screen_resolution");
    if decisive_pair {
        outcome.points = outcome.points.max(DECISIVE_PAIR_FLOOR);
        outcome
            .evidence
            .push("Strong screenshot signal: PNG + exact screen resolution".to_string());
    }

    if decisive_pair || outcome.active_count() >= thresholds.screenshot_min_markers {
        DetectorReport::claimed(SourceKind::Screenshot, outcome)
    } else {
        let note = format!(
            "Only {}/{} required markers found",
            outcome.active_count(),
            thresholds.screenshot_min_markers
        );
        DetectorReport::unclaimed(outcome, note)
    }
}

fn png_format(probe: &ImageProbe) -> Option<MarkerHit> {
    if probe.format == ImageFormatKind::Png {
        Some(MarkerHit::new(30, "PNG format detected"))
    } else {
        None
    }
}

fn exact_screen_resolution(probe: &ImageProbe) -> Option<MarkerHit> {
    let (w, h) = probe.dimensions?;
    if rules::matches_screen_resolution(w, h) {
        Some(MarkerHit::new(
            40,
            format!("Exact screen resolution detected ({w}x{h})"),
        ))
    } else {
        None
    }
}

fn lossless_compression(probe: &ImageProbe) -> Option<MarkerHit> {
    match probe.format {
        ImageFormatKind::Png => Some(MarkerHit::new(20, "Lossless PNG compression")),
        ImageFormatKind::Jpeg if probe.quality >= rules::NEAR_LOSSLESS_QUALITY_MIN => {
            Some(MarkerHit::new(
                15,
                format!("Near-lossless JPEG quality ({}%)", probe.quality),
            ))
        }
        _ => None,
    }
}

fn ui_color_patterns(probe: &ImageProbe) -> Option<MarkerHit> {
    let hits = probe.pixels.as_ref()?.ui_chrome_hits?;
    if hits >= rules::MIN_CHROME_HITS {
        Some(MarkerHit::new(15, "UI color patterns detected"))
    } else {
        None
    }
}

fn pixel_perfect_edges(probe: &ImageProbe) -> Option<MarkerHit> {
    let ratio = probe.pixels.as_ref()?.sharp_edge_ratio?;
    if ratio > rules::RENDERED_EDGE_RATIO_MIN {
        Some(MarkerHit::new(10, "Pixel-perfect edges detected"))
    } else {
        None
    }
}

/// OS screenshot pipelines stamp themselves into the Software tag
fn os_metadata(probe: &ImageProbe) -> Option<MarkerHit> {
    let software = probe.exif.software.as_deref()?;
    let software_lower = software.to_lowercase();
    let os_name = rules::OS_SOFTWARE_MARKERS
        .iter()
        .find(|marker| software_lower.contains(&marker.to_lowercase()))?;
    Some(MarkerHit::new(
        20,
        format!("OS metadata detected: {os_name}"),
    ))
}

fn no_camera_metadata(probe: &ImageProbe) -> Option<MarkerHit> {
    match probe.exif.status {
        ExifStatus::Present if !probe.exif.has_camera_fields() => Some(MarkerHit::new(
            15,
            "No camera metadata (typical for screenshots)",
        )),
        ExifStatus::Absent | ExifStatus::Unreadable => {
            Some(MarkerHit::new(10, "No EXIF metadata"))
        }
        _ => None,
    }
}

fn filename_pattern(probe: &ImageProbe) -> Option<MarkerHit> {
    let pattern = rules::match_name_pattern(&rules::SCREENSHOT_NAME_PATTERNS, &probe.filename)?;
    Some(MarkerHit::new(
        25,
        format!("Screenshot filename pattern: {pattern}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forensics::pixel_stats::PixelStats;
    use crate::forensics::probe::ExifProbe;

    fn default_thresholds() -> ForensicsThresholds {
        ForensicsThresholds::default()
    }

    fn phone_screenshot_probe() -> ImageProbe {
        ImageProbe {
            byte_len: 850_000,
            filename: "Screenshot_20241214-103300.png".to_string(),
            format: ImageFormatKind::Png,
            dimensions: Some((1080, 2340)),
            exif: ExifProbe::absent(),
            icc_present: false,
            quality: 100,
            pixels: Some(PixelStats {
                noise_ratio: Some(0.001),
                sharp_edge_ratio: Some(0.08),
                ui_chrome_hits: Some(3),
            }),
        }
    }

    #[test]
    fn phone_screenshot_claims_with_decisive_pair() {
        let report = detect(&phone_screenshot_probe(), &default_thresholds());
        assert_eq!(report.source, SourceKind::Screenshot);
        // png(30)+exact(40)+lossless(20)+ui(15)+edges(10)+no_exif(10)+name(25)
        assert_eq!(report.confidence, 100);
        assert!(report
            .evidence
            .iter()
            .any(|e| e == "Strong screenshot signal: PNG + exact screen resolution"));
    }

    #[test]
    fn decisive_pair_floors_confidence_at_85() {
        // strip everything except PNG at an exact panel size
        let mut probe = phone_screenshot_probe();
        probe.filename = "export.png".to_string();
        probe.pixels = None;
        probe.exif = ExifProbe {
            status: crate::types::ExifStatus::Present,
            section_count: 1,
            has_camera_ifd: false,
            camera_make: Some("Apple".to_string()),
            camera_model: None,
            software: None,
            timestamp: None,
            gps: None,
            setting_count: 0,
        };
        // png(30) + exact(40) + lossless(20) = 90; the floor never lowers
        let report = detect(&probe, &default_thresholds());
        assert_eq!(report.source, SourceKind::Screenshot);
        assert!(report.confidence >= DECISIVE_PAIR_FLOOR as u8);
        assert_eq!(report.confidence, 90);
        assert!(report
            .evidence
            .iter()
            .any(|e| e == "Strong screenshot signal: PNG + exact screen resolution"));
    }

    #[test]
    fn jpeg_screenshot_needs_two_markers() {
        let probe = ImageProbe {
            byte_len: 400_000,
            filename: "Screenshot_2024.jpg".to_string(),
            format: ImageFormatKind::Jpeg,
            dimensions: Some((1366, 768)),
            exif: ExifProbe::absent(),
            icc_present: false,
            quality: 98,
            pixels: None,
        };
        let report = detect(&probe, &default_thresholds());
        assert_eq!(report.source, SourceKind::Screenshot);
        // near-lossless(15) + no_exif(10) + filename(25)
        assert_eq!(report.confidence, 50);
        assert_eq!(report.active_markers, 3);
    }

    #[test]
    fn ordinary_photo_stays_unknown() {
        let probe = ImageProbe {
            byte_len: 3_000_000,
            filename: "IMG_2041.jpg".to_string(),
            format: ImageFormatKind::Jpeg,
            dimensions: Some((4000, 3000)),
            exif: ExifProbe {
                status: crate::types::ExifStatus::Present,
                section_count: 3,
                has_camera_ifd: true,
                camera_make: Some("Google".to_string()),
                camera_model: Some("Pixel 8".to_string()),
                software: Some("HDR+ 1.0".to_string()),
                timestamp: Some("2024:12:14 09:00:00".to_string()),
                gps: None,
                setting_count: 6,
            },
            icc_present: true,
            quality: 85,
            pixels: Some(PixelStats {
                noise_ratio: Some(0.05),
                sharp_edge_ratio: Some(0.004),
                ui_chrome_hits: Some(0),
            }),
        };
        let report = detect(&probe, &default_thresholds());
        assert_eq!(report.source, SourceKind::Unknown);
        assert_eq!(report.confidence, 0);
        assert_eq!(
            report.evidence.last().map(String::as_str),
            Some("Only 0/2 required markers found")
        );
    }

    #[test]
    fn os_software_tag_is_recognized() {
        let mut probe = phone_screenshot_probe();
        probe.exif = ExifProbe {
            status: crate::types::ExifStatus::Present,
            section_count: 1,
            has_camera_ifd: false,
            camera_make: None,
            camera_model: None,
            software: Some("Android 14 screenshot service".to_string()),
            timestamp: None,
            gps: None,
            setting_count: 0,
        };
        let report = detect(&probe, &default_thresholds());
        assert!(report
            .evidence
            .iter()
            .any(|e| e == "OS metadata detected: Android"));
        // EXIF present without camera fields scores the 15-point variant
        assert!(report
            .evidence
            .iter()
            .any(|e| e == "No camera metadata (typical for screenshots)"));
    }

    #[test]
    fn landscape_panel_size_matches() {
        let mut probe = phone_screenshot_probe();
        probe.dimensions = Some((2340, 1080));
        let report = detect(&probe, &default_thresholds());
        assert!(report
            .evidence
            .iter()
            .any(|e| e == "Exact screen resolution detected (2340x1080)"));
    }
}
