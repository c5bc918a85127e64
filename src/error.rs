//! Error types for the `vidsample` crate.
//!
//! This module defines [`SampleError`], the unified error type returned by all
//! fallible operations in the crate. The fatal variants abort a sampling run;
//! the per-frame variants are logged, counted, and skipped by the pipeline.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `vidsample` operations.
///
/// Every public method that can fail returns `Result<T, SampleError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SampleError {
    /// The video file could not be opened or demuxed.
    #[error("Cannot open video source at {path}: {reason}")]
    SourceUnreadable {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened, but contains no video that can be sampled.
    #[error("No usable video in {path}: {reason}")]
    EmptyOrInvalidSource {
        /// Path to the offending file.
        path: PathBuf,
        /// What exactly is missing or degenerate (no stream, zero frames,
        /// non-positive frame rate).
        reason: String,
    },

    /// The sampling parameters failed validation before any decoding began.
    #[error("Invalid sampling parameters: {0}")]
    InvalidParameters(String),

    /// The output directory could not be created or written.
    #[error("Cannot create output directory {path}: {source}")]
    OutputUnwritable {
        /// The directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// A single frame failed to decode. Non-fatal: the pipeline logs it,
    /// counts the frame as skipped, and continues.
    #[error("Failed to decode frame {index}: {reason}")]
    FrameDecodeFailed {
        /// Source-frame index that could not be decoded.
        index: u64,
        /// Underlying reason.
        reason: String,
    },

    /// A single frame failed to encode to disk. Non-fatal, like decode
    /// failures.
    #[error("Failed to encode frame to {path}: {reason}")]
    FrameEncodeFailed {
        /// Destination path of the failed write.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
}

impl SampleError {
    /// Whether this error aborts a whole sampling run.
    ///
    /// Per-frame decode and encode failures are isolated to the frame they
    /// affect; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SampleError::FrameDecodeFailed { .. } | SampleError::FrameEncodeFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_are_not_fatal() {
        let decode = SampleError::FrameDecodeFailed {
            index: 3,
            reason: "truncated packet".to_string(),
        };
        assert!(!decode.is_fatal());

        let encode = SampleError::FrameEncodeFailed {
            path: PathBuf::from("frame_00_00_000.png"),
            reason: "disk full".to_string(),
        };
        assert!(!encode.is_fatal());
    }

    #[test]
    fn setup_errors_are_fatal() {
        let invalid = SampleError::InvalidParameters("fps must be positive".to_string());
        assert!(invalid.is_fatal());

        let unreadable = SampleError::SourceUnreadable {
            path: PathBuf::from("missing.mp4"),
            reason: "No such file or directory".to_string(),
        };
        assert!(unreadable.is_fatal());
    }
}
