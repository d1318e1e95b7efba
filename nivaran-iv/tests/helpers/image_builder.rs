//! Image Fixture Builders
//!
//! Generates small synthetic PNG/JPEG images in memory, optionally with a
//! spliced EXIF APP1 segment, so integration tests exercise the probe and
//! the detectors against real container bytes instead of hand-built facts.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use std::io::Cursor;

/// Camera metadata to embed in a JPEG fixture
#[derive(Debug, Clone)]
pub struct CameraExif {
    pub make: &'static str,
    pub model: &'static str,
    pub datetime: &'static str,
    /// Decimal-degree position; north and east are positive
    pub gps: Option<(f64, f64)>,
    /// Also write four exposure settings (shutter, aperture, ISO, focal)
    pub with_settings: bool,
}

impl Default for CameraExif {
    fn default() -> Self {
        Self {
            make: "Google",
            model: "Pixel 7",
            datetime: "2025:08:14 10:15:00",
            gps: Some((17.3850, 78.4867)),
            with_settings: true,
        }
    }
}

/// Encode a flat single-color PNG
pub fn flat_png(width: u32, height: u32, luma: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([luma, luma, luma]));
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ColorType::Rgb8)
        .expect("png encoding");
    out
}

/// Encode a flat single-color JPEG at quality 80
pub fn flat_jpeg(width: u32, height: u32, luma: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([luma, luma, luma]));
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 80)
        .encode(img.as_raw(), width, height, ColorType::Rgb8)
        .expect("jpeg encoding");
    out
}

/// Splice an EXIF APP1 segment into a JPEG, right after SOI
///
/// # Arguments
/// * `jpeg` - Encoded JPEG bytes to annotate
/// * `spec` - Camera metadata to embed
///
/// # Returns
/// A new JPEG carrying the EXIF block
pub fn with_exif(jpeg: &[u8], spec: &CameraExif) -> Vec<u8> {
    assert!(jpeg.starts_with(&[0xFF, 0xD8]), "fixture must be a JPEG");
    let tiff = encode_tiff(spec);
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn rational(tag: Tag, parts: Vec<Rational>) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(parts),
    }
}

/// Degrees / minutes / centiseconds of arc, the usual camera encoding
fn dms(decimal: f64) -> Vec<Rational> {
    let abs = decimal.abs();
    let degrees = abs.floor();
    let minutes = ((abs - degrees) * 60.0).floor();
    let seconds = (abs - degrees - minutes / 60.0) * 3600.0;
    vec![
        Rational {
            num: degrees as u32,
            denom: 1,
        },
        Rational {
            num: minutes as u32,
            denom: 1,
        },
        Rational {
            num: (seconds * 100.0).round() as u32,
            denom: 100,
        },
    ]
}

fn encode_tiff(spec: &CameraExif) -> Vec<u8> {
    let mut fields = vec![
        ascii(Tag::Make, spec.make),
        ascii(Tag::Model, spec.model),
        ascii(Tag::DateTime, spec.datetime),
    ];
    if spec.with_settings {
        fields.push(rational(
            Tag::ExposureTime,
            vec![Rational { num: 1, denom: 120 }],
        ));
        fields.push(rational(
            Tag::FNumber,
            vec![Rational { num: 18, denom: 10 }],
        ));
        fields.push(Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![100]),
        });
        fields.push(rational(
            Tag::FocalLength,
            vec![Rational { num: 49, denom: 10 }],
        ));
    }
    if let Some((lat, lng)) = spec.gps {
        fields.push(ascii(
            Tag::GPSLatitudeRef,
            if lat >= 0.0 { "N" } else { "S" },
        ));
        fields.push(rational(Tag::GPSLatitude, dms(lat)));
        fields.push(ascii(
            Tag::GPSLongitudeRef,
            if lng >= 0.0 { "E" } else { "W" },
        ));
        fields.push(rational(Tag::GPSLongitude, dms(lng)));
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut cursor = Cursor::new(Vec::new());
    writer.write(&mut cursor, false).expect("exif encoding");
    cursor.into_inner()
}
