//! The sampling pipeline.
//!
//! [`FrameSampler`] ties the pieces together: validate options, open the
//! source, create the output directory, then walk the sample plan — decode,
//! resize, write — and report what happened as a [`SampleReport`].
//!
//! Setup problems (bad parameters, unreadable source, unwritable output) are
//! fatal and abort the run before any frame is touched. Problems with a
//! single frame are logged, counted, and skipped; the run continues.
//!
//! # Example
//!
//! ```no_run
//! use vidsample::{FrameSampler, SampleOptions};
//!
//! let sampler = FrameSampler::new(
//!     "input.mp4",
//!     "frames_input",
//!     SampleOptions::new().with_target_fps(2.0),
//! );
//! let report = sampler.run()?;
//! println!("{} written, {} skipped", report.written, report.skipped);
//! # Ok::<(), vidsample::SampleError>(())
//! ```

use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, info, warn};

use crate::{
    config::SampleOptions,
    error::SampleError,
    progress::ProgressTracker,
    selector::SamplePlan,
    source::VideoSource,
    transform::resize_frame,
    writer::FrameWriter,
};

/// Counts from a completed sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct SampleReport {
    /// Frame tasks the plan produced and the pipeline attempted.
    pub attempted: u64,
    /// Frames successfully written to disk.
    pub written: u64,
    /// Frames lost to decode or encode failures.
    pub skipped: u64,
}

/// One configured sampling run.
///
/// Construct with [`FrameSampler::new`], execute with [`FrameSampler::run`].
/// The source handle lives entirely inside `run` and is released on every
/// exit path.
#[derive(Debug)]
pub struct FrameSampler {
    input: PathBuf,
    output_dir: PathBuf,
    options: SampleOptions,
}

impl FrameSampler {
    /// Create a sampler for `input`, writing frames into `output_dir`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output_dir: Q,
        options: SampleOptions,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            options,
        }
    }

    /// Run the pipeline to completion.
    ///
    /// # Errors
    ///
    /// - [`SampleError::InvalidParameters`] — checked first, before the
    ///   source is opened or any directory created.
    /// - [`SampleError::SourceUnreadable`] / [`SampleError::EmptyOrInvalidSource`]
    ///   — from opening the input.
    /// - [`SampleError::OutputUnwritable`] — from creating the output
    ///   directory.
    ///
    /// Per-frame decode and encode failures do **not** abort the run; they
    /// are logged via [`log::warn!`] and show up in
    /// [`SampleReport::skipped`].
    pub fn run(&self) -> Result<SampleReport, SampleError> {
        self.options.validate()?;

        let mut source = VideoSource::open(&self.input)?;
        let metadata = source.metadata().clone();
        debug!(
            "opened {}: {}x{} {} @ {:.3} fps, ~{} frames",
            self.input.display(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.native_fps,
            metadata.total_frames,
        );

        let writer = FrameWriter::create(&self.output_dir)?;

        let plan = SamplePlan::new(&metadata, self.options.target_fps);
        let expected = plan.expected_task_count();
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            Some(expected),
            self.options.progress_batch,
        );

        // The plan is not restartable; build it once for the unique decode
        // indices and once for the task walk below.
        let mut unique_indices: Vec<u64> = SamplePlan::new(&metadata, self.options.target_fps)
            .map(|task| task.source_index)
            .collect();
        unique_indices.dedup();

        let mut frames = source.frames(unique_indices)?;

        let mut report = SampleReport::default();
        // The single in-flight frame: the most recently decoded (index,
        // image) pair. Duplicate tasks at the same index reuse it.
        let mut current: Option<(u64, DynamicImage)> = None;
        let mut last_emitted_index: Option<u64> = None;

        for task in plan {
            if self.options.dedupe && last_emitted_index == Some(task.source_index) {
                // Oversampling produced a second task for the same source
                // frame and the caller asked for one file per frame.
                continue;
            }

            report.attempted += 1;

            // Advance the decoder until it catches up with this task.
            while current
                .as_ref()
                .is_none_or(|(index, _)| *index < task.source_index)
            {
                match frames.next() {
                    Some(Ok(pair)) => current = Some(pair),
                    Some(Err(error)) => {
                        // Tied to a single frame; the loop below notices the
                        // missing index and counts the skip.
                        warn!("{error}");
                    }
                    None => break,
                }
            }

            match &current {
                Some((index, image)) if *index == task.source_index => {
                    let output = resize_frame(image, self.options.resize.as_ref());
                    match writer.write(task.timestamp_ms, task.sample_ordinal, &output) {
                        Ok(path) => {
                            debug!(
                                "frame {} -> {}",
                                task.source_index,
                                path.display(),
                            );
                            report.written += 1;
                            last_emitted_index = Some(task.source_index);
                        }
                        Err(error) => {
                            warn!("{error}");
                            report.skipped += 1;
                        }
                    }
                }
                _ => {
                    warn!(
                        "frame {} could not be decoded, skipping",
                        task.source_index,
                    );
                    report.skipped += 1;
                }
            }

            tracker.advance(Some(task.source_index), Some(task.timestamp_ms));
        }

        tracker.finish();
        info!(
            "sampled {} frames from {}: {} written, {} skipped",
            report.attempted,
            self.input.display(),
            report.written,
            report.skipped,
        );

        Ok(report)
    }

    /// The input path this sampler reads from.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The directory this sampler writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
