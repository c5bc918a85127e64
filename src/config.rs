//! Sampling configuration.
//!
//! [`SampleOptions`] is a builder that carries the target rate, optional
//! resize target, duplicate handling, and progress settings through the
//! pipeline without polluting every function signature. Options are validated
//! once, up front, before any file is opened or frame decoded.
//!
//! # Example
//!
//! ```
//! use vidsample::{ResizeSpec, SampleOptions};
//!
//! let options = SampleOptions::new()
//!     .with_target_fps(2.0)
//!     .with_resize(Some("1280x720".parse::<ResizeSpec>().unwrap()))
//!     .with_dedupe(true);
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SampleError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Exact output dimensions for resized frames.
///
/// Parses from the CLI `WxH` form (e.g. `1280x720`); both dimensions must be
/// positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl FromStr for ResizeSpec {
    type Err = SampleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            SampleError::InvalidParameters(format!(
                "invalid resize '{value}', expected WxH (e.g. 1280x720)"
            ))
        };

        let (width_str, height_str) = value
            .to_ascii_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.to_string(), h.to_string()))
            .ok_or_else(invalid)?;

        let width: u32 = width_str.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height_str.trim().parse().map_err(|_| invalid())?;

        let spec = Self { width, height };
        spec.validate()?;
        Ok(spec)
    }
}

impl std::fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl ResizeSpec {
    /// Reject zero-sized dimensions.
    ///
    /// Parsing already enforces this; the check exists for specs constructed
    /// directly.
    pub fn validate(&self) -> Result<(), SampleError> {
        if self.width == 0 || self.height == 0 {
            return Err(SampleError::InvalidParameters(format!(
                "resize dimensions must be positive, got {self}"
            )));
        }
        Ok(())
    }
}

/// Options for one sampling run.
///
/// Built with `with_*` methods; a default-constructed value samples at 1 fps
/// with no resizing, writes duplicates, and reports no progress.
#[derive(Clone)]
pub struct SampleOptions {
    /// Frames to extract per second of source time. May be below 1.
    pub(crate) target_fps: f64,
    /// Optional exact resize applied to every frame before writing.
    pub(crate) resize: Option<ResizeSpec>,
    /// When `true`, oversampled duplicate source indices collapse to a
    /// single output file each.
    pub(crate) dedupe: bool,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// How often the progress callback fires (every N tasks).
    pub(crate) progress_batch: u64,
}

impl Debug for SampleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SampleOptions")
            .field("target_fps", &self.target_fps)
            .field("resize", &self.resize)
            .field("dedupe", &self.dedupe)
            .field("progress_batch", &self.progress_batch)
            .finish_non_exhaustive()
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleOptions {
    /// Create options with the defaults: 1 fps, no resize, duplicates kept,
    /// no progress reporting.
    pub fn new() -> Self {
        Self {
            target_fps: 1.0,
            resize: None,
            dedupe: false,
            progress: Arc::new(NoOpProgress),
            progress_batch: 1,
        }
    }

    /// Set the sampling rate in frames per second of source time.
    #[must_use]
    pub fn with_target_fps(mut self, target_fps: f64) -> Self {
        self.target_fps = target_fps;
        self
    }

    /// Set (or clear) the exact resize applied before writing.
    #[must_use]
    pub fn with_resize(mut self, resize: Option<ResizeSpec>) -> Self {
        self.resize = resize;
        self
    }

    /// Collapse duplicate source indices to a single output file each when
    /// the target rate exceeds the native rate.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `batch` tasks instead of every task.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_progress_batch(mut self, batch: u64) -> Self {
        self.progress_batch = batch.max(1);
        self
    }

    /// The configured sampling rate.
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// The configured resize target, if any.
    pub fn resize(&self) -> Option<&ResizeSpec> {
        self.resize.as_ref()
    }

    /// Validate the whole spec. Runs once, before the source is opened, so
    /// bad parameters never touch FFmpeg or the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::InvalidParameters`] for a non-positive or
    /// non-finite rate, or a degenerate resize target.
    pub fn validate(&self) -> Result<(), SampleError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(SampleError::InvalidParameters(format!(
                "target fps must be positive, got {}",
                self.target_fps
            )));
        }
        if let Some(resize) = &self.resize {
            resize.validate()?;
        }
        Ok(())
    }
}

/// Default output directory for a given input: `frames_<video_stem>` next to
/// the working directory.
///
/// Pure function of the input path — the naming rule lives nowhere else.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    PathBuf::from(format!("frames_{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_resize() {
        let spec: ResizeSpec = "1280x720".parse().unwrap();
        assert_eq!((spec.width, spec.height), (1280, 720));

        // Uppercase separator is tolerated.
        let spec: ResizeSpec = "640X480".parse().unwrap();
        assert_eq!((spec.width, spec.height), (640, 480));
    }

    #[test]
    fn rejects_malformed_resize() {
        assert!("1280".parse::<ResizeSpec>().is_err());
        assert!("x720".parse::<ResizeSpec>().is_err());
        assert!("1280x".parse::<ResizeSpec>().is_err());
        assert!("0x480".parse::<ResizeSpec>().is_err());
        assert!("640x0".parse::<ResizeSpec>().is_err());
        assert!("-640x480".parse::<ResizeSpec>().is_err());
        assert!("wide x tall".parse::<ResizeSpec>().is_err());
    }

    #[test]
    fn validates_rate_bounds() {
        assert!(SampleOptions::new().with_target_fps(0.5).validate().is_ok());
        assert!(SampleOptions::new().with_target_fps(0.0).validate().is_err());
        assert!(SampleOptions::new().with_target_fps(-1.0).validate().is_err());
        assert!(
            SampleOptions::new()
                .with_target_fps(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn default_output_dir_uses_stem() {
        assert_eq!(
            default_output_dir(Path::new("clips/holiday.mp4")),
            PathBuf::from("frames_holiday"),
        );
        assert_eq!(
            default_output_dir(Path::new("video.mkv")),
            PathBuf::from("frames_video"),
        );
    }
}
