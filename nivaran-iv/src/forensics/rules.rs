//! Marker-rule machinery shared by the three source detectors
//!
//! Each detector is an ordered table of independent rules. Evaluation
//! never short-circuits: every rule runs against the probe, every hit
//! contributes its points and one evidence line, and the gate decision
//! happens afterwards over the counts. Changing what a detector looks
//! for means editing its table, not its control flow.
//!
//! The closed calibration tables (phone aspect ratios, resize targets,
//! screen resolutions, camera brands, filename conventions) also live
//! here so all three detectors draw from one place.

use super::probe::ImageProbe;
use once_cell::sync::Lazy;
use regex::Regex;

/// One rule that fired: points awarded plus its audit-trail line
#[derive(Debug, Clone)]
pub(crate) struct MarkerHit {
    pub points: u32,
    pub note: String,
}

impl MarkerHit {
    pub fn new(points: u32, note: impl Into<String>) -> Self {
        Self {
            points,
            note: note.into(),
        }
    }
}

/// A single detector rule
///
/// `strong` marks rules counted against the original-photo detector's
/// strict gate; the other detectors gate on the plain active count.
pub(crate) struct MarkerRule {
    pub name: &'static str,
    pub strong: bool,
    pub check: fn(&ImageProbe) -> Option<MarkerHit>,
}

/// Result of evaluating one rule table against a probe
#[derive(Debug, Default)]
pub(crate) struct RuleOutcome {
    /// Uncapped point sum; callers cap at 100 when assembling a verdict
    pub points: u32,
    pub evidence: Vec<String>,
    /// Names of the rules that fired, in table order
    pub active: Vec<&'static str>,
    pub strong_active: usize,
}

impl RuleOutcome {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| *n == name)
    }
}

/// Run every rule in table order
pub(crate) fn evaluate(rules: &[MarkerRule], probe: &ImageProbe) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    for rule in rules {
        if let Some(hit) = (rule.check)(probe) {
            outcome.points += hit.points;
            outcome.evidence.push(hit.note);
            outcome.active.push(rule.name);
            if rule.strong {
                outcome.strong_active += 1;
            }
        }
    }
    outcome
}

// ============================================================================
// Calibration Tables
// ============================================================================

/// Messenger recompression keeps JPEGs inside this size window, bytes
pub(crate) const FORWARDED_SIZE_RANGE: (usize, usize) = (100_000, 500_000);

/// Estimated JPEG quality band typical of messenger recompression
pub(crate) const FORWARDED_QUALITY_RANGE: (u8, u8) = (60, 75);

/// Reduced aspect ratios phone cameras produce
pub(crate) const PHONE_ASPECT_RATIOS: [(u32, u32); 4] = [(9, 16), (16, 9), (4, 3), (3, 4)];

/// Dimensions messengers resize to, matched within [`RESIZE_TOLERANCE`]
pub(crate) const FORWARDED_RESIZE_TARGETS: [(u32, u32); 6] = [
    (1600, 1200),
    (1280, 960),
    (1024, 768),
    (800, 600),
    (640, 480),
    (720, 1280),
];

/// Per-axis tolerance for resize-target matching, pixels
pub(crate) const RESIZE_TOLERANCE: u32 = 50;

/// Longest-edge length that counts as a full-resolution camera capture
pub(crate) const HIGH_RESOLUTION_MIN_EDGE: u32 = 3000;

/// Estimated JPEG quality above which recompression is unlikely
pub(crate) const HIGH_QUALITY_MIN: u8 = 80;

/// Noise-ratio band consistent with camera sensor grain (inclusive)
pub(crate) const SENSOR_NOISE_RANGE: (f32, f32) = (0.02, 0.15);

/// Make strings recognized as camera or phone manufacturers
pub(crate) const CAMERA_BRANDS: [&str; 11] = [
    "Apple", "Samsung", "Google", "OnePlus", "Xiaomi", "Huawei", "OPPO", "Vivo", "Sony", "Canon",
    "Nikon",
];

/// Camera settings required before the settings marker fires
pub(crate) const MIN_CAMERA_SETTINGS: u8 = 4;

/// EXIF sections required before the full-EXIF marker fires
pub(crate) const MIN_EXIF_SECTIONS: u8 = 2;

/// Native device screen resolutions, portrait orientation
pub(crate) const SCREEN_RESOLUTIONS: [(u32, u32); 18] = [
    (1125, 2436),
    (1242, 2688),
    (1170, 2532),
    (828, 1792),
    (750, 1334),
    (640, 1136),
    (1284, 2778),
    (1080, 2340),
    (1080, 1920),
    (1080, 2400),
    (1440, 2960),
    (720, 1280),
    (1080, 2280),
    (1440, 3040),
    (1440, 2880),
    (2048, 2732),
    (1668, 2388),
    (1536, 2048),
];

/// Tablet/laptop panel sizes tested in addition to [`SCREEN_RESOLUTIONS`]
pub(crate) const WIDE_SCREEN_RESOLUTIONS: [(u32, u32); 1] = [(2560, 1600)];

/// Estimated JPEG quality that still counts as near-lossless
pub(crate) const NEAR_LOSSLESS_QUALITY_MIN: u8 = 95;

/// Sharp-edge density above which a raster looks rendered, not captured
pub(crate) const RENDERED_EDGE_RATIO_MIN: f32 = 0.01;

/// Chrome probes (of 4) that must hit before the UI-color marker fires
pub(crate) const MIN_CHROME_HITS: u8 = 2;

/// Software-tag substrings that identify an OS screenshot pipeline
pub(crate) const OS_SOFTWARE_MARKERS: [&str; 5] =
    ["Android", "iOS", "Windows", "macOS", "Screenshot"];

/// Messenger naming conventions, tried in order; first match is reported
pub(crate) static FORWARDED_NAME_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_patterns(&[r"img-\d{8}-wa\d{4}", r"wa\d{4}", r"whatsapp"])
});

/// Screenshot naming conventions, tried in order; first match is reported
pub(crate) static SCREENSHOT_NAME_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_patterns(&[
        r"screenshot",
        r"screen_?shot",
        r"capture",
        r"snap",
        r"screen_\d+",
    ])
});

fn compile_patterns(patterns: &[&'static str]) -> Vec<(&'static str, Regex)> {
    patterns
        .iter()
        .map(|p| {
            let compiled = Regex::new(&format!("(?i){p}")).expect("static filename pattern");
            (*p, compiled)
        })
        .collect()
}

/// First naming convention the filename matches
pub(crate) fn match_name_pattern(
    patterns: &[(&'static str, Regex)],
    filename: &str,
) -> Option<&'static str> {
    patterns
        .iter()
        .find(|(_, re)| re.is_match(filename))
        .map(|(pattern, _)| *pattern)
}

/// Reduce a pixel size to its lowest-term aspect ratio
pub(crate) fn reduced_aspect(width: u32, height: u32) -> (u32, u32) {
    let d = gcd(width, height);
    if d == 0 {
        return (width, height);
    }
    (width / d, height / d)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Whether dimensions match a device screen in either orientation
pub(crate) fn matches_screen_resolution(width: u32, height: u32) -> bool {
    SCREEN_RESOLUTIONS
        .iter()
        .chain(WIDE_SCREEN_RESOLUTIONS.iter())
        .any(|&(a, b)| (width == a && height == b) || (width == b && height == a))
}

/// Whether dimensions sit within tolerance of a messenger resize target
pub(crate) fn matches_resize_target(width: u32, height: u32) -> bool {
    FORWARDED_RESIZE_TARGETS.iter().any(|&(tw, th)| {
        width.abs_diff(tw) <= RESIZE_TOLERANCE && height.abs_diff(th) <= RESIZE_TOLERANCE
    })
}
