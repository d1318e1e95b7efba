//! Test Helper Utilities
//!
//! Shared fixture builders for nivaran-iv integration tests

pub mod image_builder;

// Re-export commonly used items
pub use image_builder::{flat_jpeg, flat_png, with_exif, CameraExif};
