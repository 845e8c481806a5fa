//! Decode, downscale, flatten onto white, re-encode as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, Rgb, RgbImage};
use std::time::Duration;
use thiserror::Error;

use crate::print::PrintSpec;

pub const DECODE_TIMEOUT: Duration = Duration::from_secs(5);
pub const OUTPUT_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Decode failed: {0}")]
    Decode(#[source] ImageError),

    #[error("Decode timed out after {0:?}")]
    DecodeTimeout(Duration),

    #[error("Decode task aborted: {0}")]
    Aborted(String),

    #[error("Encode failed: {0}")]
    Encode(#[source] ImageError),
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, RasterError> {
    image::load_from_memory(bytes).map_err(RasterError::Decode)
}

/// Decodes on the blocking pool, bounded by `timeout`.
pub async fn decode_with_timeout(bytes: Vec<u8>, timeout: Duration) -> Result<DynamicImage, RasterError> {
    let task = tokio::task::spawn_blocking(move || decode(&bytes));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(RasterError::Aborted(join.to_string())),
        Err(_) => Err(RasterError::DecodeTimeout(timeout)),
    }
}

/// Target dimensions: width capped at `max_width`, aspect ratio kept.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

/// Alpha-composites over an opaque white background.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, p) in rgba.enumerate_pixels() {
        let a = p.0[3] as f32 / 255.0;
        let blend = |c: u8| (c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        out.put_pixel(x, y, Rgb([blend(p.0[0]), blend(p.0[1]), blend(p.0[2])]));
    }
    out
}

/// Print-ready JPEG bytes for a decoded image.
pub fn rasterize(img: &DynamicImage, spec: &PrintSpec) -> Result<Vec<u8>, RasterError> {
    let (width, height) = img.dimensions();
    let (target_w, target_h) = fit_width(width, height, spec.max_image_width());

    let flattened = if (target_w, target_h) == (width, height) {
        flatten_on_white(img)
    } else {
        flatten_on_white(&img.resize_exact(target_w, target_h, FilterType::Lanczos3))
    };

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, spec.jpeg_quality);
    encoder.encode_image(&flattened).map_err(RasterError::Encode)?;
    Ok(buf)
}
