//! Progress reporting.
//!
//! A [`ProgressCallback`] observes a run as frames are sampled and
//! thumbnails are processed. The binary drives an `indicatif` bar from it;
//! library users can plug in their own reporter.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mt::{ProgressCallback, ProgressInfo, SheetGenerator, SheetOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {}/{}", info.stage, info.current, info.total);
//!     }
//! }
//!
//! let generator = SheetGenerator::new(SheetOptions::new())?
//!     .with_progress(Arc::new(PrintProgress));
//! # Ok::<(), mt::SheetError>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// The pipeline stage being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Stage {
    /// Fetching frames from the video (including blank-frame retries).
    Sampling,
    /// Resizing, filtering and stamping thumbnails.
    Processing,
}

/// A snapshot of progress within one stage of one video.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Stage being reported.
    pub stage: Stage,
    /// Items finished so far in this stage.
    pub current: u64,
    /// Items expected in this stage.
    pub total: u64,
    /// Wall-clock time since the stage started.
    pub elapsed: Duration,
    /// Accepted timestamp of the item just finished, when known.
    pub timestamp: Option<Duration>,
}

/// Receives progress updates.
///
/// Implementations must be [`Send`] and [`Sync`]: processing updates arrive
/// from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called once per finished item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts finished items for one stage and forwards snapshots.
///
/// Shared by reference across worker threads.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    stage: Stage,
    total: u64,
    current: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, stage: Stage, total: u64) -> Self {
        Self {
            callback,
            stage,
            total,
            current: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one finished item.
    pub(crate) fn advance(&self, timestamp: Option<Duration>) {
        let current = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.callback.on_progress(&ProgressInfo {
            stage: self.stage,
            current,
            total: self.total,
            elapsed: self.start_time.elapsed(),
            timestamp,
        });
    }
}
