//! User-facing message catalog
//!
//! One fixed sentence per reason code, joined with `" | "` in firing
//! order. The copy is shown to citizens verbatim; wording changes go
//! through the product side, not this file.

use super::codes::ReasonCode;

/// Message for a record with no fired codes
pub const VALIDATION_PASSED: &str = "Image validation passed.";

const SEPARATOR: &str = " | ";

/// The fixed sentence for one reason code
pub fn message_for(code: ReasonCode) -> &'static str {
    match code {
        ReasonCode::AiGenerated => {
            "This image appears to be AI-generated or synthetic. Please upload a genuine \
             photograph of the issue."
        }
        ReasonCode::SuspectedAiGenerated => {
            "This image shows patterns consistent with AI-generated content. Please upload a \
             genuine photograph taken with your camera."
        }
        ReasonCode::ResubmittedImage => {
            "This image has already been submitted for a resolved complaint. Please upload a \
             new photo."
        }
        ReasonCode::NoExifData => {
            "This image does not contain EXIF metadata. Please upload a photo taken directly \
             from your camera with location services enabled. Note: WhatsApp and social media \
             images are not accepted."
        }
        ReasonCode::LocationMismatch => {
            "The GPS location in the image does not match your reported location. This may \
             indicate the photo was taken elsewhere."
        }
        ReasonCode::LocationNotAvailable => {
            "No GPS data found in the image. For verification, please ensure location services \
             are enabled when taking photos."
        }
        ReasonCode::ImageIssueMismatch => {
            "The image content may not match the selected issue type. Please verify you've \
             selected the correct category."
        }
        ReasonCode::ImageContentMismatch => {
            "Our AI analysis detected that the image content does not match the reported issue \
             type. Please upload a relevant photo or select the correct category."
        }
        ReasonCode::LowVisionConfidence => {
            "The image quality is too low or unclear for proper analysis. Please upload a \
             clearer photo taken in good lighting."
        }
        ReasonCode::WhatsappForwardedImage => {
            "This appears to be a WhatsApp forwarded image. While accepted, please note that \
             original photos provide better verification."
        }
        ReasonCode::ScreenshotDetected => {
            "This appears to be a screenshot. While accepted, please note that original photos \
             of the issue provide better verification."
        }
        ReasonCode::OriginalPhotoVerified => {
            "This appears to be an original phone photo with full metadata. Excellent \
             authenticity verification."
        }
        ReasonCode::ForensicsReviewRequired => {
            "The image source could not be determined with high confidence. Manual review may \
             be required."
        }
    }
}

/// Compose the record message from the fired codes, in firing order
pub fn compose(codes: &[ReasonCode]) -> String {
    if codes.is_empty() {
        return VALIDATION_PASSED.to_string();
    }
    codes
        .iter()
        .map(|c| message_for(*c))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
