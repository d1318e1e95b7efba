//! Configuration resolution for nivaran-iv
//!
//! Provides two-tier configuration resolution with ENV → TOML priority.
//! Every knob is plain data: components receive their section by value at
//! construction and never consult the environment afterwards, so two
//! instances built from the same config always behave identically.

use nivaran_common::{config::resolve_config_path, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming the config file (overridden by `--config`)
pub const CONFIG_PATH_ENV: &str = "NIVARAN_IV_CONFIG";

/// Environment override for [`ValidationPolicy::strict_exif`]
pub const STRICT_EXIF_ENV: &str = "NIVARAN_IV_STRICT_EXIF";

/// Decision-engine policy knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Reject images that carry no GPS, no capture timestamp, and no
    /// camera make at all
    pub strict_exif: bool,
    /// Location-consistency radius used when the resolver does not supply
    /// one, km
    pub default_allowed_radius_km: f32,
    /// Best-match similarity at or above which an index hit counts as a
    /// resubmission
    pub duplicate_similarity_threshold: f32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            strict_exif: false,
            default_allowed_radius_km: 10.0,
            duplicate_similarity_threshold: 0.90,
        }
    }
}

/// Source-classifier gate thresholds
///
/// The marker weights themselves are calibrated constants in the detector
/// tables; only the gates that decide whether a detector may claim its
/// source are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForensicsThresholds {
    /// Winning confidence below this is logged as advisory; the
    /// recommendation stays ACCEPT either way
    pub min_classify_confidence: u8,
    /// Active markers required before the forwarded-image detector may
    /// claim WHATSAPP
    pub forwarded_min_markers: usize,
    /// Strong markers required before the original-photo detector may
    /// claim ORIGINAL_PHOTO
    pub original_min_strong_markers: usize,
    /// Active markers required before the screenshot detector may claim
    /// SCREENSHOT (bypassed by the PNG + exact-screen-resolution pair)
    pub screenshot_min_markers: usize,
}

impl Default for ForensicsThresholds {
    fn default() -> Self {
        Self {
            min_classify_confidence: 70,
            forwarded_min_markers: 3,
            original_min_strong_markers: 3,
            screenshot_min_markers: 2,
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvConfig {
    pub policy: ValidationPolicy,
    pub forensics: ForensicsThresholds,
}

impl IvConfig {
    /// Load configuration with ENV → TOML priority
    ///
    /// The file path resolves CLI argument → `NIVARAN_IV_CONFIG` → platform
    /// config directory. A missing file is not an error; defaults apply.
    pub fn load(cli_path: Option<&str>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path, CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("no config file found; using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "configuration loaded from TOML");
        Ok(config)
    }

    /// Environment tier: overrides the TOML tier field by field
    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(STRICT_EXIF_ENV) {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => {
                    if !self.policy.strict_exif {
                        info!("strict EXIF mode enabled from environment");
                    }
                    self.policy.strict_exif = true;
                }
                "0" | "false" | "no" | "off" => self.policy.strict_exif = false,
                other => warn!(
                    value = other,
                    "unrecognized {} value; keeping configured strict_exif={}",
                    STRICT_EXIF_ENV,
                    self.policy.strict_exif
                ),
            }
        }
    }
}
