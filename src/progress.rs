//! Progress reporting.
//!
//! [`ProgressCallback`] lets callers observe a sampling run without the
//! pipeline knowing how progress is rendered — the CLI plugs in a terminal
//! progress bar, tests plug in counters. Callbacks observe but cannot halt
//! the run.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use vidsample::{ProgressCallback, ProgressInfo, SampleOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{:?} frames", info.current, info.total);
//!     }
//! }
//!
//! let options = SampleOptions::new().with_progress(Arc::new(PrintProgress));
//! # let _ = options;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of sampling progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled by
/// [`SampleOptions::with_progress_batch`](crate::SampleOptions::with_progress_batch).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many frame tasks have been processed so far (written or skipped).
    pub current: u64,
    /// Total tasks expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since sampling started.
    pub elapsed: Duration,
    /// The source-frame index currently being processed.
    pub current_frame: Option<u64>,
    /// The timestamp (ms) currently being processed.
    pub current_timestamp_ms: Option<u64>,
}

/// Trait for receiving progress updates during a sampling run.
///
/// Implementations must be [`Send`] and [`Sync`] so a single callback can be
/// shared between the pipeline and whatever renders it.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during the sampling loop.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks timing and emits batched callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed task and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, frame_index: Option<u64>, timestamp_ms: Option<u64>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(frame_index, timestamp_ms);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None, None);
    }

    fn report(&self, frame_index: Option<u64>, timestamp_ms: Option<u64>) {
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let info = ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_frame: frame_index,
            current_timestamp_ms: timestamp_ms,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recording {
        snapshots: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recording {
        fn on_progress(&self, info: &ProgressInfo) {
            self.snapshots.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn batching_limits_report_frequency() {
        let recording = Arc::new(Recording {
            snapshots: Mutex::new(Vec::new()),
        });
        let mut tracker = ProgressTracker::new(recording.clone(), Some(10), 4);

        for i in 0..10 {
            tracker.advance(Some(i), Some(i * 100));
        }
        tracker.finish();

        let snapshots = recording.snapshots.lock().unwrap();
        // Two batched reports (after 4 and 8) plus the final one.
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots.last().unwrap().current, 10);
        assert_eq!(snapshots.last().unwrap().percentage, Some(100.0));
    }

    #[test]
    fn percentage_absent_without_total() {
        let recording = Arc::new(Recording {
            snapshots: Mutex::new(Vec::new()),
        });
        let mut tracker = ProgressTracker::new(recording.clone(), None, 1);
        tracker.advance(Some(0), Some(0));

        let snapshots = recording.snapshots.lock().unwrap();
        assert_eq!(snapshots[0].percentage, None);
    }
}
