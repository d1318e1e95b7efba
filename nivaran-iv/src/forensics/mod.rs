//! Image source forensics
//!
//! Determines where a submitted photo came from (an original camera
//! capture, a messenger-forwarded copy, or a screen capture) using only
//! container structure, metadata, and raster statistics. Purely local and
//! purely advisory: no detector claim is ever the sole reason a report is
//! blocked.
//!
//! # Architecture
//! [`probe`] reduces the raw bytes to an [`ImageProbe`] fact sheet once.
//! The three detectors each score an ordered marker table against that
//! probe and may claim their source kind when their gate clears.
//! [`SourceForensics::classify`] runs all three and keeps the strongest
//! claim.
//!
//! # Error Handling
//! Probe construction is total. A fact that cannot be computed degrades to
//! absent and the rules that need it simply do not fire, so malformed
//! uploads settle to UNKNOWN instead of erroring.

mod forwarded;
mod original;
pub mod pixel_stats;
pub mod probe;
mod quality;
mod rules;
mod screenshot;

pub use pixel_stats::PixelStats;
pub use probe::{ExifProbe, ImageFormatKind, ImageProbe};

use crate::config::ForensicsThresholds;
use rules::RuleOutcome;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where an image came from, as far as forensics can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    /// Straight off a camera with its metadata intact
    OriginalPhoto,
    /// Recompressed and stripped by a messenger hop
    Whatsapp,
    /// Captured from a device screen
    Screenshot,
    /// No detector could claim the image
    Unknown,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::OriginalPhoto => "ORIGINAL_PHOTO",
            SourceKind::Whatsapp => "WHATSAPP",
            SourceKind::Screenshot => "SCREENSHOT",
            SourceKind::Unknown => "UNKNOWN",
        }
    }
}

/// Advisory handling hint attached to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Accept,
    Review,
}

/// Raw output of one source detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorReport {
    /// Claimed source, or [`SourceKind::Unknown`] below the gate
    pub source: SourceKind,
    /// Capped marker-point sum (0-100); 0 when unclaimed
    pub confidence: u8,
    /// One line per marker that fired, in table order
    pub evidence: Vec<String>,
    pub active_markers: usize,
    pub strong_markers: usize,
}

impl DetectorReport {
    /// The gate cleared; the detector claims its source
    fn claimed(source: SourceKind, outcome: RuleOutcome) -> Self {
        Self {
            source,
            confidence: outcome.points.min(100) as u8,
            active_markers: outcome.active.len(),
            strong_markers: outcome.strong_active,
            evidence: outcome.evidence,
        }
    }

    /// The gate did not clear; evidence is kept, the claim is withdrawn
    fn unclaimed(outcome: RuleOutcome, note: String) -> Self {
        let mut evidence = outcome.evidence;
        evidence.push(note);
        Self {
            source: SourceKind::Unknown,
            confidence: 0,
            active_markers: outcome.active.len(),
            strong_markers: outcome.strong_active,
            evidence,
        }
    }
}

/// Final classification for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicsVerdict {
    pub source: SourceKind,
    /// Winning detector confidence (0-100)
    pub confidence: u8,
    /// Winning detector's evidence lines; empty when UNKNOWN
    pub evidence: Vec<String>,
    pub recommendation: Recommendation,
    /// Per-detector reports in precedence order: original, forwarded,
    /// screenshot
    pub breakdown: Vec<DetectorReport>,
}

impl ForensicsVerdict {
    /// Verdict for an image no detector claimed
    pub fn unknown(evidence: Vec<String>) -> Self {
        Self {
            source: SourceKind::Unknown,
            confidence: 0,
            evidence,
            recommendation: Recommendation::Accept,
            breakdown: Vec::new(),
        }
    }

    /// Confidence as a 0.0-1.0 fraction
    pub fn confidence_fraction(&self) -> f32 {
        f32::from(self.confidence) / 100.0
    }
}

/// Runs the three source detectors and keeps the strongest claim
#[derive(Debug, Clone, Default)]
pub struct SourceForensics {
    thresholds: ForensicsThresholds,
}

impl SourceForensics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ForensicsThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify raw image bytes
    ///
    /// Never fails: undecodable input yields an UNKNOWN verdict with
    /// whatever evidence the detectors could still gather.
    pub fn classify(&self, bytes: &[u8], filename: &str) -> ForensicsVerdict {
        let probe = ImageProbe::inspect(bytes, filename);
        self.classify_probe(&probe)
    }

    /// Classify a pre-built probe
    pub fn classify_probe(&self, probe: &ImageProbe) -> ForensicsVerdict {
        let reports = [
            original::detect(probe, &self.thresholds),
            forwarded::detect(probe, &self.thresholds),
            screenshot::detect(probe, &self.thresholds),
        ];

        let verdict = match select_winner(&reports) {
            Some(i) => {
                let winner = &reports[i];
                if winner.confidence < self.thresholds.min_classify_confidence {
                    debug!(
                        source = winner.source.as_str(),
                        confidence = winner.confidence,
                        "classification is below the advisory threshold"
                    );
                }
                ForensicsVerdict {
                    source: winner.source,
                    confidence: winner.confidence,
                    evidence: winner.evidence.clone(),
                    // a source claim alone never blocks a report
                    recommendation: Recommendation::Accept,
                    breakdown: reports.to_vec(),
                }
            }
            None => {
                debug!(filename = %probe.filename, "no detector claimed the image");
                ForensicsVerdict {
                    breakdown: reports.to_vec(),
                    ..ForensicsVerdict::unknown(Vec::new())
                }
            }
        };

        debug!(
            source = verdict.source.as_str(),
            confidence = verdict.confidence,
            "source classification complete"
        );
        verdict
    }
}

/// Index of the strongest claiming report
///
/// Strictly-greater comparison over the precedence-ordered slice resolves
/// confidence ties toward the earlier (stricter) detector.
fn select_winner(reports: &[DetectorReport]) -> Option<usize> {
    let mut winner: Option<usize> = None;
    for (i, report) in reports.iter().enumerate() {
        if report.source == SourceKind::Unknown {
            continue;
        }
        if winner.map_or(true, |w| report.confidence > reports[w].confidence) {
            winner = Some(i);
        }
    }
    winner
}
