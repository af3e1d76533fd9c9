use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::ProcessingError;

/// Decoded source pixels. Read-only once decoded; resizing always produces a
/// new buffer.
#[derive(Debug, Clone)]
pub struct DecodedImage(DynamicImage);

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.0
    }
}

/// Decode any supported raster format (JPEG, PNG, WebP).
pub fn decode(input: &[u8]) -> Result<DecodedImage, ProcessingError> {
    let img = image::load_from_memory(input).map_err(|e| ProcessingError::Decode(e.to_string()))?;

    log::debug!("Decoded image: {}x{} ({:?})", img.width(), img.height(), img.color());

    Ok(DecodedImage(img))
}

/// Largest side a baseline JPEG can carry.
pub const MAX_JPEG_DIMENSION: u32 = 65535;

/// Height that keeps the aspect ratio at `target_width`, rounded half up and
/// never below 1. `None` when it does not fit in a `u32`.
pub fn resized_height(width: u32, height: u32, target_width: u32) -> Option<u32> {
    if width == 0 {
        return Some(1);
    }
    let (w, h, tw) = (width as u128, height as u128, target_width as u128);
    let scaled = (h * tw * 2 + w) / (w * 2);
    u32::try_from(scaled.max(1)).ok()
}

/// Resize to `target_width` (Lanczos3) and encode as JPEG at `quality` (1-100).
pub fn resize_and_encode(
    img: &DecodedImage,
    target_width: u32,
    quality: u8,
) -> Result<Vec<u8>, ProcessingError> {
    if target_width == 0 {
        return Err(ProcessingError::Encode("target width must be positive".into()));
    }

    let (width, height) = img.0.dimensions();
    let target_height = resized_height(width, height, target_width)
        .filter(|h| *h <= MAX_JPEG_DIMENSION && target_width <= MAX_JPEG_DIMENSION)
        .ok_or_else(|| {
            ProcessingError::Encode(format!(
                "{width}x{height} resized to width {target_width} exceeds the JPEG limit of {MAX_JPEG_DIMENSION} px"
            ))
        })?;
    let resized = img.0.resize_exact(target_width, target_height, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();

    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.clamp(1, 100));

    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;

    log::debug!(
        "Encoded {}x{} -> {}x{} at q{}: {} bytes",
        width,
        height,
        target_width,
        target_height,
        quality,
        output.len()
    );

    Ok(output)
}
