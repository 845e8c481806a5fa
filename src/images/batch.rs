//! Batch driver: every slot, one at a time, all-or-nothing commit.
//!
//! idle -> running -> done, running -> idle on cancellation, done -> idle on
//! dismissal. Cancellation is observed only between slots.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::fetch::Fetcher;
use super::prepare::{bytes_to_mb, prepare_image, PrepareContext};
use super::slots::ImageSet;
use super::PipelineEvents;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Batch driver is {0:?}, expected Idle")]
    NotIdle(RunState),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Done,
}

/// Shared cancellation flag for the current run
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn rearm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTiming {
    /// Pause before each slot
    pub slot_delay: Duration,
    /// Pause after the last slot, before the run is marked done
    pub settle_delay: Duration,
}

impl BatchTiming {
    pub fn immediate() -> Self {
        Self { slot_delay: Duration::ZERO, settle_delay: Duration::ZERO }
    }
}

impl Default for BatchTiming {
    fn default() -> Self {
        Self {
            slot_delay: Duration::from_millis(50),
            settle_delay: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionStats {
    pub fn original_mb(&self) -> f64 {
        bytes_to_mb(self.original_bytes)
    }

    pub fn compressed_mb(&self) -> f64 {
        bytes_to_mb(self.compressed_bytes)
    }

    pub fn saved_percent(&self) -> i64 {
        if self.original_bytes == 0 {
            return 0;
        }
        let saved = self.original_bytes as f64 - self.compressed_bytes as f64;
        (saved / self.original_bytes as f64 * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { images: ImageSet, stats: CompressionStats },
    Cancelled,
}

/// Records transcript lines while forwarding to the caller's sink.
struct Transcript<'a> {
    inner: &'a dyn PipelineEvents,
    lines: Mutex<Vec<String>>,
}

impl<'a> Transcript<'a> {
    fn new(inner: &'a dyn PipelineEvents) -> Self {
        Self { inner, lines: Mutex::new(vec![]) }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PipelineEvents for Transcript<'_> {
    fn log(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
        self.inner.log(message);
    }

    fn status(&self, message: &str) {
        self.inner.status(message);
    }

    fn progress(&self, percent: u8, current: &str) {
        self.inner.progress(percent, current);
    }
}

pub struct BatchDriver {
    ctx: PrepareContext,
    timing: BatchTiming,
    state: RunState,
    cancel: CancelHandle,
    logs: Vec<String>,
    progress: u8,
    stats: CompressionStats,
}

impl BatchDriver {
    pub fn new(ctx: PrepareContext, timing: BatchTiming) -> Self {
        Self {
            ctx,
            timing,
            state: RunState::Idle,
            cancel: CancelHandle::default(),
            logs: vec![],
            progress: 0,
            stats: CompressionStats::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Transcript of the last run
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Totals of the last completed run
    pub fn stats(&self) -> CompressionStats {
        self.stats
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Prepares every slot and hands back a full replacement set.
    ///
    /// The input set is never modified; on cancellation nothing is returned.
    pub async fn run(
        &mut self,
        images: &ImageSet,
        fetcher: &dyn Fetcher,
        events: &dyn PipelineEvents,
    ) -> Result<RunOutcome, BatchError> {
        if self.state != RunState::Idle {
            return Err(BatchError::NotIdle(self.state));
        }

        self.cancel.rearm();
        self.state = RunState::Running;
        self.logs.clear();
        self.progress = 0;
        self.stats = CompressionStats::default();

        let transcript = Transcript::new(events);
        let outcome = self.process(images, fetcher, &transcript).await;
        self.logs = transcript.into_lines();

        match &outcome {
            RunOutcome::Completed { stats, .. } => {
                self.stats = *stats;
                self.state = RunState::Done;
                info!(
                    original_mb = stats.original_mb(),
                    compressed_mb = stats.compressed_mb(),
                    saved_percent = stats.saved_percent(),
                    "Compression run done"
                );
            }
            RunOutcome::Cancelled => {
                self.state = RunState::Idle;
                info!("Compression run cancelled");
            }
        }
        Ok(outcome)
    }

    async fn process(&mut self, images: &ImageSet, fetcher: &dyn Fetcher, events: &Transcript<'_>) -> RunOutcome {
        events.log("Stage 1: initialising...");

        let mut prepared = images.clone();
        let mut stats = CompressionStats::default();
        let total = images.len();

        for (i, slot) in images.iter().enumerate() {
            if self.cancel.is_cancelled() {
                events.log("Cancelled.");
                return RunOutcome::Cancelled;
            }
            tokio::time::sleep(self.timing.slot_delay).await;

            self.advance(percent(i, total));
            events.progress(self.progress, &format!("Processing {}/{}: {}", i + 1, total, slot.name));

            let result = prepare_image(&slot.source, &slot.name, fetcher, &self.ctx, events).await;
            stats.original_bytes += result.original_size;
            stats.compressed_bytes += result.compressed_size;
            if result.is_changed(&slot.source) {
                prepared.replace(&slot.name, result.image);
            } else {
                debug!(slot = %slot.name, "Slot keeps its original image");
            }
        }

        if self.cancel.is_cancelled() {
            events.log("Cancelled.");
            return RunOutcome::Cancelled;
        }

        self.advance(100);
        events.progress(self.progress, "Finalising...");
        tokio::time::sleep(self.timing.settle_delay).await;

        RunOutcome::Completed { images: prepared, stats }
    }

    fn advance(&mut self, percent: u8) {
        self.progress = self.progress.max(percent);
    }

    /// Done -> Idle. Clears the last run and re-arms cancellation.
    pub fn dismiss(&mut self) -> bool {
        if self.state != RunState::Done {
            return false;
        }
        self.state = RunState::Idle;
        self.cancel.rearm();
        self.logs.clear();
        self.progress = 0;
        true
    }
}

impl Default for BatchDriver {
    fn default() -> Self {
        Self::new(PrepareContext::default(), BatchTiming::default())
    }
}

fn percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((index as f64 / total as f64) * 100.0).round() as u8
}
