//! JPEG compression-quality estimation
//!
//! Approximates the encoder quality setting from bytes-per-pixel density.
//! Coarse by design: the detectors only compare the estimate against band
//! boundaries (forwarded 60-75, near-lossless >=95), so a banded estimate
//! is enough.

/// Estimated quality for a non-JPEG container (lossless or out of scope)
pub(crate) const NON_JPEG_QUALITY: u8 = 100;

/// Fallback when the pixel count is unknown
pub(crate) const UNKNOWN_QUALITY: u8 = 80;

/// Estimate JPEG quality (0-100) from file size and pixel count
///
/// Non-JPEG input reports 100. When dimensions are unavailable the
/// estimate falls back to a neutral 80, which sits outside every band the
/// detectors test.
pub(crate) fn estimate(is_jpeg: bool, byte_len: usize, dimensions: Option<(u32, u32)>) -> u8 {
    if !is_jpeg {
        return NON_JPEG_QUALITY;
    }
    let pixels = match dimensions {
        Some((w, h)) if w > 0 && h > 0 => u64::from(w) * u64::from(h),
        _ => return UNKNOWN_QUALITY,
    };

    let bytes_per_pixel = byte_len as f64 / pixels as f64;
    if bytes_per_pixel > 3.0 {
        98
    } else if bytes_per_pixel > 2.0 {
        92
    } else if bytes_per_pixel > 1.5 {
        85
    } else if bytes_per_pixel > 1.0 {
        75
    } else if bytes_per_pixel > 0.5 {
        65
    } else {
        50
    }
}
