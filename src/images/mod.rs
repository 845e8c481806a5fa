//! Image Preparation Pipeline
//!
//! Turns the offer's image slots into print-safe embedded JPEGs.
//!
//! | Stage | Module |
//! |---|---|
//! | Slot collection | [`slots`] |
//! | URL / data URL handling | [`source`] |
//! | Direct fetch, then two relays | [`fetch`] |
//! | Decode, downscale, flatten, JPEG | [`raster`] |
//! | One slot, never fails | [`prepare`] |
//! | All slots, cancellable, atomic commit | [`batch`] |

pub mod batch;
pub mod fetch;
pub mod prepare;
pub mod raster;
pub mod slots;
pub mod source;

pub use batch::{BatchDriver, BatchError, BatchTiming, CancelHandle, CompressionStats, RunOutcome, RunState};
pub use fetch::{FetchError, Fetcher, HttpFetcher, RetrievalPlan, RetrievalStrategy, Target};
pub use prepare::{prepare_image, PrepareContext, PreparedImage};
pub use slots::{ImageSet, ImageSlot};
pub use source::{EmbeddedImage, ImageSource};

use tracing::{debug, info};

/// Progress and transcript sink for a pipeline run
pub trait PipelineEvents: Send + Sync {
    /// One transcript line: attempt failures and per-slot summaries.
    fn log(&self, message: &str);

    /// Transient phase description for the slot in flight.
    fn status(&self, message: &str);

    fn progress(&self, _percent: u8, _current: &str) {}
}

/// Forwards pipeline events to `tracing`.
pub struct TracingEvents;

impl PipelineEvents for TracingEvents {
    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn status(&self, message: &str) {
        debug!(status = message);
    }

    fn progress(&self, percent: u8, current: &str) {
        info!(percent, "{}", current);
    }
}
