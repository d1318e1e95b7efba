//! Image probe: distills raw bytes into the facts the detectors score
//!
//! Construction never fails. Each fact degrades independently: pixels
//! that do not decode drop the raster statistics, an EXIF block that does
//! not parse becomes [`ExifStatus::Unreadable`], an unrecognized container
//! skips the quality estimate. A malformed upload still produces a probe,
//! just one with fewer facts for the detectors to score.

use super::pixel_stats::{self, PixelStats};
use super::quality;
use crate::types::ExifStatus;
use exif::{Context, In, Tag, Value};
use nivaran_common::Coordinates;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::{debug, warn};

/// Container format determined from the leading signature bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFormatKind {
    Jpeg,
    Png,
    Other,
}

/// The seven exposure-related tags counted as "camera settings"
const SETTING_TAGS: [Tag; 7] = [
    Tag::ExposureTime,
    Tag::FNumber,
    Tag::PhotographicSensitivity,
    Tag::Flash,
    Tag::FocalLength,
    Tag::WhiteBalance,
    Tag::ExposureMode,
];

/// EXIF facts reduced from raw tags to what the detectors test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExifProbe {
    pub status: ExifStatus,
    /// Populated IFD sections: primary, camera sub-IFD, thumbnail (0-3)
    pub section_count: u8,
    /// The camera sub-IFD (exposure data) exists at all
    pub has_camera_ifd: bool,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    /// Software tag, when a processing tool or OS recorded itself
    pub software: Option<String>,
    /// DateTime from the primary IFD, raw EXIF string form
    pub timestamp: Option<String>,
    pub gps: Option<Coordinates>,
    /// How many of the seven exposure-related settings are present (0-7)
    pub setting_count: u8,
}

impl ExifProbe {
    pub fn absent() -> Self {
        Self {
            status: ExifStatus::Absent,
            section_count: 0,
            has_camera_ifd: false,
            camera_make: None,
            camera_model: None,
            software: None,
            timestamp: None,
            gps: None,
            setting_count: 0,
        }
    }

    pub fn unreadable() -> Self {
        Self {
            status: ExifStatus::Unreadable,
            ..Self::absent()
        }
    }

    pub fn has_gps(&self) -> bool {
        self.gps.is_some()
    }

    /// Make or model present, in either order
    pub fn has_camera_fields(&self) -> bool {
        self.camera_make.is_some() || self.camera_model.is_some()
    }
}

/// Everything the source detectors know about one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageProbe {
    pub byte_len: usize,
    /// Filename as submitted, used only for naming-convention checks
    pub filename: String,
    pub format: ImageFormatKind,
    pub dimensions: Option<(u32, u32)>,
    pub exif: ExifProbe,
    pub icc_present: bool,
    /// Estimated JPEG quality; non-JPEG containers report 100
    pub quality: u8,
    /// Raster statistics; `None` when the pixel data did not decode
    pub pixels: Option<PixelStats>,
}

impl ImageProbe {
    /// Inspect raw image bytes
    pub fn inspect(bytes: &[u8], filename: &str) -> Self {
        let format = sniff_format(bytes);

        // Header-only parse: survives truncated pixel data
        let dimensions = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()
            .and_then(|r| r.into_dimensions().ok());

        let pixels = match image::load_from_memory(bytes) {
            Ok(img) => Some(pixel_stats::measure(&img)),
            Err(e) => {
                debug!(filename, error = %e, "pixel data did not decode; raster stats unavailable");
                None
            }
        };

        Self {
            byte_len: bytes.len(),
            filename: filename.to_string(),
            format,
            dimensions,
            exif: read_exif(bytes),
            icc_present: icc_present(bytes, format),
            quality: quality::estimate(format == ImageFormatKind::Jpeg, bytes.len(), dimensions),
            pixels,
        }
    }
}

fn sniff_format(bytes: &[u8]) -> ImageFormatKind {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        ImageFormatKind::Jpeg
    } else if bytes.starts_with(b"\x89PNG") {
        ImageFormatKind::Png
    } else {
        ImageFormatKind::Other
    }
}

/// Parse the EXIF block, distinguishing absent from unreadable
pub(crate) fn read_exif(bytes: &[u8]) -> ExifProbe {
    let mut cursor = Cursor::new(bytes);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(data) => summarize_exif(&data),
        Err(exif::Error::NotFound(_)) => ExifProbe::absent(),
        Err(e) => {
            warn!(error = %e, "EXIF block present but unreadable");
            ExifProbe::unreadable()
        }
    }
}

fn summarize_exif(data: &exif::Exif) -> ExifProbe {
    let mut primary = false;
    let mut camera_ifd = false;
    let mut thumbnail = false;
    for field in data.fields() {
        if field.ifd_num == In::THUMBNAIL {
            thumbnail = true;
            continue;
        }
        match field.tag.0 {
            Context::Exif => camera_ifd = true,
            Context::Tiff => primary = true,
            // GPS and interop IFDs are tracked through their own fields
            _ => {}
        }
    }
    let section_count = u8::from(primary) + u8::from(camera_ifd) + u8::from(thumbnail);

    let setting_count = SETTING_TAGS
        .iter()
        .filter(|tag| data.get_field(**tag, In::PRIMARY).is_some())
        .count() as u8;

    ExifProbe {
        status: ExifStatus::Present,
        section_count,
        has_camera_ifd: camera_ifd,
        camera_make: ascii_value(data, Tag::Make),
        camera_model: ascii_value(data, Tag::Model),
        software: ascii_value(data, Tag::Software),
        timestamp: ascii_value(data, Tag::DateTime),
        gps: gps_coordinates(data),
        setting_count,
    }
}

/// First ASCII value of a primary-IFD tag, trimmed; empty strings drop out
fn ascii_value(data: &exif::Exif, tag: Tag) -> Option<String> {
    let field = data.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(items) => items
            .first()
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Decimal GPS position; requires both latitude and longitude
fn gps_coordinates(data: &exif::Exif) -> Option<Coordinates> {
    let lat = dms_to_decimal(data.get_field(Tag::GPSLatitude, In::PRIMARY)?)?;
    let lng = dms_to_decimal(data.get_field(Tag::GPSLongitude, In::PRIMARY)?)?;
    let lat_sign = hemisphere_sign(data, Tag::GPSLatitudeRef, b'S');
    let lng_sign = hemisphere_sign(data, Tag::GPSLongitudeRef, b'W');
    Some(Coordinates {
        lat: lat * lat_sign,
        lng: lng * lng_sign,
    })
}

fn dms_to_decimal(field: &exif::Field) -> Option<f64> {
    match &field.value {
        Value::Rational(parts) => {
            let degrees = parts.first()?.to_f64();
            let minutes = parts.get(1).map(|r| r.to_f64()).unwrap_or(0.0);
            let seconds = parts.get(2).map(|r| r.to_f64()).unwrap_or(0.0);
            Some(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}

fn hemisphere_sign(data: &exif::Exif, tag: Tag, negative: u8) -> f64 {
    match data.get_field(tag, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Ascii(items)) if items.first().and_then(|v| v.first()) == Some(&negative) => {
            -1.0
        }
        _ => 1.0,
    }
}

/// Scan for an embedded ICC color profile without decoding pixels
fn icc_present(bytes: &[u8], format: ImageFormatKind) -> bool {
    match format {
        ImageFormatKind::Jpeg => jpeg_has_icc(bytes),
        ImageFormatKind::Png => png_has_iccp(bytes),
        ImageFormatKind::Other => false,
    }
}

/// Walk JPEG segments looking for an APP2 ICC_PROFILE block
fn jpeg_has_icc(bytes: &[u8]) -> bool {
    let mut i = 2usize; // past SOI
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return false;
        }
        let marker = bytes[i + 1];
        // standalone markers carry no length word
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            i += 2;
            continue;
        }
        // entropy-coded data from SOS onward; no more metadata segments
        if marker == 0xDA {
            return false;
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if len < 2 || i + 2 + len > bytes.len() {
            return false;
        }
        if marker == 0xE2 && bytes[i + 4..i + 2 + len].starts_with(b"ICC_PROFILE\0") {
            return true;
        }
        i += 2 + len;
    }
    false
}

/// Scan PNG chunks for iCCP, stopping at the pixel data
fn png_has_iccp(bytes: &[u8]) -> bool {
    let mut i = 8usize; // past signature
    while i + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]) as usize;
        let kind = &bytes[i + 4..i + 8];
        if kind == b"iCCP" {
            return true;
        }
        if kind == b"IDAT" || kind == b"IEND" {
            return false;
        }
        i += 12 + len; // length + type + data + crc
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ColorType, ImageEncoder, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 200, 200]));
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, ColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn sniffs_signatures() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormatKind::Jpeg);
        assert_eq!(sniff_format(b"\x89PNG\r\n\x1a\n"), ImageFormatKind::Png);
        assert_eq!(sniff_format(b"GIF89a"), ImageFormatKind::Other);
        assert_eq!(sniff_format(&[]), ImageFormatKind::Other);
    }

    #[test]
    fn probe_of_garbage_bytes_degrades_every_field() {
        let probe = ImageProbe::inspect(b"not an image at all", "note.txt");
        assert_eq!(probe.format, ImageFormatKind::Other);
        assert_eq!(probe.dimensions, None);
        assert_eq!(probe.exif.status, ExifStatus::Absent);
        assert!(!probe.icc_present);
        assert_eq!(probe.quality, 100);
        assert!(probe.pixels.is_none());
    }

    #[test]
    fn probe_of_plain_png_reads_dimensions_and_pixels() {
        let bytes = png_bytes(320, 240);
        let probe = ImageProbe::inspect(&bytes, "plain.png");
        assert_eq!(probe.format, ImageFormatKind::Png);
        assert_eq!(probe.dimensions, Some((320, 240)));
        assert_eq!(probe.exif.status, ExifStatus::Absent);
        assert_eq!(probe.quality, 100);
        assert!(probe.pixels.is_some());
        assert!(!probe.icc_present);
    }

    #[test]
    fn truncated_png_keeps_header_dimensions() {
        let bytes = png_bytes(320, 240);
        // keep the signature and IHDR, drop the pixel data
        let probe = ImageProbe::inspect(&bytes[..40], "cut.png");
        assert_eq!(probe.format, ImageFormatKind::Png);
        assert_eq!(probe.dimensions, Some((320, 240)));
        assert!(probe.pixels.is_none());
    }

    #[test]
    fn jpeg_icc_scan_finds_app2_profile() {
        // SOI, APP2 with ICC_PROFILE identifier, EOI
        let mut bytes = vec![0xFF, 0xD8];
        let payload = b"ICC_PROFILE\0\x01\x01fake";
        bytes.extend_from_slice(&[0xFF, 0xE2]);
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        assert!(jpeg_has_icc(&bytes));
    }

    #[test]
    fn jpeg_icc_scan_stops_at_scan_data() {
        // APP0 then SOS; an ICC marker after SOS must not be found
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46]);
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
        bytes.extend_from_slice(b"ICC_PROFILE\0");
        assert!(!jpeg_has_icc(&bytes));
    }

    #[test]
    fn png_iccp_chunk_is_detected() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        // minimal iCCP chunk: length 4, type, data, crc
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(b"iCCP");
        bytes.extend_from_slice(b"abcd");
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(png_has_iccp(&bytes));
        assert!(!png_has_iccp(&png_bytes(32, 32)));
    }

    #[test]
    fn exif_probe_helpers() {
        let absent = ExifProbe::absent();
        assert!(!absent.has_gps());
        assert!(!absent.has_camera_fields());

        let mut present = ExifProbe::absent();
        present.status = ExifStatus::Present;
        present.camera_model = Some("Pixel 7".to_string());
        assert!(present.has_camera_fields());
    }
}
