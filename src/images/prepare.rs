//! Per-slot preparation: acquire bytes, rasterize for print, never fail.
//!
//! Any failure leaves the slot's original reference in place with zero sizes.

use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::fetch::{retrieve, Fetcher, RetrievalPlan};
use super::raster::{self, RasterError, DECODE_TIMEOUT, OUTPUT_MIME};
use super::source::{EmbeddedImage, ImageSource};
use super::PipelineEvents;
use crate::print::PrintSpec;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Error)]
enum PrepareError {
    #[error("Invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Settings shared by every slot of a run
#[derive(Debug, Clone)]
pub struct PrepareContext {
    pub plan: RetrievalPlan,
    pub print: PrintSpec,
    pub decode_timeout: Duration,
}

impl Default for PrepareContext {
    fn default() -> Self {
        Self {
            plan: RetrievalPlan::default(),
            print: PrintSpec::default(),
            decode_timeout: DECODE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub original_size: u64,
    pub compressed_size: u64,
    pub image: ImageSource,
}

impl PreparedImage {
    fn unchanged(source: &ImageSource) -> Self {
        Self { original_size: 0, compressed_size: 0, image: source.clone() }
    }

    pub fn is_changed(&self, source: &ImageSource) -> bool {
        &self.image != source
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub async fn prepare_image(
    source: &ImageSource,
    label: &str,
    fetcher: &dyn Fetcher,
    ctx: &PrepareContext,
    events: &dyn PipelineEvents,
) -> PreparedImage {
    match source {
        ImageSource::Embedded(embedded) => prepare_embedded(source, embedded, label, ctx, events).await,
        ImageSource::Remote(url) => prepare_remote(source, url, label, fetcher, ctx, events).await,
    }
}

async fn prepare_embedded(
    source: &ImageSource,
    embedded: &EmbeddedImage,
    label: &str,
    ctx: &PrepareContext,
    events: &dyn PipelineEvents,
) -> PreparedImage {
    events.status("Local optimisation...");
    let original_size = embedded.estimated_size();

    match encode_embedded(embedded, ctx).await {
        Ok(jpeg) => {
            info!(slot = label, original_size, compressed_size = jpeg.len(), "Embedded image compressed");
            events.log(&format!("{}: local -> compressed OK", label));
            finished(original_size, jpeg)
        }
        Err(e) => {
            warn!(slot = label, error = %e, "Embedded image unreadable");
            events.log(&format!("{}: local read failed", label));
            PreparedImage::unchanged(source)
        }
    }
}

async fn prepare_remote(
    source: &ImageSource,
    url: &str,
    label: &str,
    fetcher: &dyn Fetcher,
    ctx: &PrepareContext,
    events: &dyn PipelineEvents,
) -> PreparedImage {
    let retrieved = match retrieve(fetcher, url, label, &ctx.plan, events).await {
        Ok(r) => r,
        Err(e) => {
            warn!(slot = label, url, error = %e, "Download failed");
            events.log(&format!("{}: download failed - original kept.", label));
            return PreparedImage::unchanged(source);
        }
    };

    // Raw download buffer is consumed by the decoder and dropped on every path.
    let original_size = retrieved.bytes.len() as u64;
    events.status("Decoding and compressing...");

    match encode_for_print(retrieved.bytes, ctx).await {
        Ok(jpeg) => {
            let compressed_size = jpeg.len() as u64;
            info!(slot = label, strategy = %retrieved.strategy, original_size, compressed_size, "Remote image compressed");
            events.log(&format!(
                "{}: {:.2}MB -> {:.2}MB",
                label,
                bytes_to_mb(original_size),
                bytes_to_mb(compressed_size)
            ));
            finished(original_size, jpeg)
        }
        Err(e) => {
            warn!(slot = label, error = %e, "Image processing failed");
            events.log(&format!("{}: image processing failed - original kept.", label));
            PreparedImage::unchanged(source)
        }
    }
}

async fn encode_embedded(embedded: &EmbeddedImage, ctx: &PrepareContext) -> Result<Vec<u8>, PrepareError> {
    let bytes = embedded.decode()?;
    Ok(encode_for_print(bytes, ctx).await?)
}

async fn encode_for_print(bytes: Vec<u8>, ctx: &PrepareContext) -> Result<Vec<u8>, RasterError> {
    let img = raster::decode_with_timeout(bytes, ctx.decode_timeout).await?;
    raster::rasterize(&img, &ctx.print)
}

fn finished(original_size: u64, jpeg: Vec<u8>) -> PreparedImage {
    PreparedImage {
        original_size,
        compressed_size: jpeg.len() as u64,
        image: ImageSource::Embedded(EmbeddedImage::from_bytes(OUTPUT_MIME, &jpeg)),
    }
}
