use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sabzi_core::{CaptureError, CapturedImage};
use sabzi_types::ImageSource;

/// Shrink to fit inside `max_width` x `max_height`, keeping the aspect ratio.
/// Images that already fit are returned untouched.
pub fn fit_within(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Triangle)
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));

    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| CaptureError::Decode(format!("failed to encode JPEG: {e}")))?;

    Ok(buffer)
}

/// Decode any supported image, optionally downscale it, and re-encode as JPEG
pub fn prepare_frame_blocking(
    bytes: &[u8],
    max_size: Option<(u32, u32)>,
    quality: u8,
    source: ImageSource,
) -> Result<CapturedImage, CaptureError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| CaptureError::Decode(e.to_string()))?;

    let image = match max_size {
        Some((w, h)) => fit_within(decoded, w, h),
        None => decoded,
    };

    let jpeg = encode_jpeg(&image, quality)?;
    Ok(CapturedImage::new(jpeg, image.width(), image.height(), source))
}

/// Same as [`prepare_frame_blocking`] but off the async workers
pub async fn prepare_frame(
    bytes: Vec<u8>,
    max_size: Option<(u32, u32)>,
    quality: u8,
    source: ImageSource,
) -> Result<CapturedImage, CaptureError> {
    tokio::task::spawn_blocking(move || prepare_frame_blocking(&bytes, max_size, quality, source))
        .await
        .map_err(|e| CaptureError::Decode(format!("image worker failed: {e}")))?
}
