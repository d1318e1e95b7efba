//! Pixel-level statistics for source detection
//!
//! Three cheap measurements over the decoded raster:
//! - sensor-noise ratio over a central sample window (camera CCDs leave
//!   broadband noise that heavy recompression and synthetic rendering
//!   both remove)
//! - sharp-edge density across the full frame (rendered UI is full of
//!   hard 1px transitions; lens images almost never are)
//! - chrome probes at the four edge midpoints (status and navigation
//!   bars are near-white or pure black/white)
//!
//! Each measurement skips images too small for its window and reports
//! `None` instead of extrapolating.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Minimum edge length for the noise sample window
const NOISE_MIN_EDGE: u32 = 200;
/// Minimum edge length for the gradient scan
const EDGE_MIN_EDGE: u32 = 50;
/// Minimum edge length for the chrome probes
const CHROME_MIN_EDGE: u32 = 100;
/// Luma delta that counts as a sharp transition
const SHARP_DELTA: i32 = 50;
/// Channel floor for a near-white probe hit
const NEAR_WHITE_FLOOR: u8 = 240;

/// Raster measurements; `None` means the image was too small to measure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelStats {
    /// Population std-dev over mean luma of the central sample window
    pub noise_ratio: Option<f32>,
    /// Fraction of pixel pairs with a luma step above `SHARP_DELTA`
    pub sharp_edge_ratio: Option<f32>,
    /// Edge-midpoint probes (of 4) that look like UI chrome
    pub ui_chrome_hits: Option<u8>,
}

/// Measure a decoded image
pub(crate) fn measure(img: &DynamicImage) -> PixelStats {
    PixelStats {
        noise_ratio: noise_ratio(img),
        sharp_edge_ratio: sharp_edge_ratio(img),
        ui_chrome_hits: ui_chrome_hits(img),
    }
}

/// Relative luma variation over a central window of up to 200x200 pixels
///
/// The window starts at (w/4, h/4) so frame edges and letterboxing do not
/// skew the sample.
fn noise_ratio(img: &DynamicImage) -> Option<f32> {
    let (width, height) = img.dimensions();
    if width < NOISE_MIN_EDGE || height < NOISE_MIN_EDGE {
        return None;
    }
    let luma = img.to_luma8();
    let sample_w = NOISE_MIN_EDGE.min(width / 2);
    let sample_h = NOISE_MIN_EDGE.min(height / 2);
    let (x0, y0) = (width / 4, height / 4);

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in y0..y0 + sample_h {
        for x in x0..x0 + sample_w {
            let p = f64::from(luma.get_pixel(x, y)[0]);
            sum += p;
            sum_sq += p * p;
        }
    }
    let count = f64::from(sample_w) * f64::from(sample_h);
    let mean = sum / count;
    let variance = (sum_sq / count - mean * mean).max(0.0);
    Some((variance.sqrt() / (mean + 1.0)) as f32)
}

/// Fraction of horizontal and vertical neighbor pairs with a hard luma step
fn sharp_edge_ratio(img: &DynamicImage) -> Option<f32> {
    let (width, height) = img.dimensions();
    if width < EDGE_MIN_EDGE || height < EDGE_MIN_EDGE {
        return None;
    }
    let luma = img.to_luma8();
    let mut sharp = 0u64;
    for y in 0..height {
        for x in 0..width {
            let p = i32::from(luma.get_pixel(x, y)[0]);
            if x + 1 < width {
                let right = i32::from(luma.get_pixel(x + 1, y)[0]);
                if (right - p).abs() > SHARP_DELTA {
                    sharp += 1;
                }
            }
            if y + 1 < height {
                let below = i32::from(luma.get_pixel(x, y + 1)[0]);
                if (below - p).abs() > SHARP_DELTA {
                    sharp += 1;
                }
            }
        }
    }
    Some(sharp as f32 / (u64::from(width) * u64::from(height)) as f32)
}

/// Probe the four edge midpoints for status-bar / navigation-bar colors
///
/// A probe hits when the pixel is pure black, pure white, or near-white
/// (all channels >= 240).
fn ui_chrome_hits(img: &DynamicImage) -> Option<u8> {
    let (width, height) = img.dimensions();
    if width < CHROME_MIN_EDGE || height < CHROME_MIN_EDGE {
        return None;
    }
    let rgb = img.to_rgb8();
    let probes = [
        (width / 2, 10),
        (width / 2, height - 10),
        (10, height / 2),
        (width - 10, height / 2),
    ];

    let mut hits = 0u8;
    for (x, y) in probes {
        let px = rgb.get_pixel(x, y);
        let (r, g, b) = (px[0], px[1], px[2]);
        let extreme_gray = r == g && g == b && (r == 0 || r == u8::MAX);
        let near_white = r >= NEAR_WHITE_FLOOR && g >= NEAR_WHITE_FLOOR && b >= NEAR_WHITE_FLOOR;
        if extreme_gray || near_white {
            hits += 1;
        }
    }
    Some(hits)
}
