//! Timestamp-named frame output.
//!
//! [`FrameWriter`] owns the output directory and encodes frames as lossless
//! PNGs named after their source timestamp: `frame_MM_SS_mmm.png`. Because
//! timestamps are monotonically non-decreasing across a run, names are
//! naturally collision-free except when oversampling duplicates a source
//! index — in that case the writer appends a deterministic suffix derived
//! from the sample ordinal instead of overwriting.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageFormat};
use log::debug;

use crate::error::SampleError;

/// Writes frames into a flat output directory.
///
/// # Example
///
/// ```no_run
/// use image::DynamicImage;
/// use vidsample::FrameWriter;
///
/// let writer = FrameWriter::create("frames_clip")?;
/// let frame = DynamicImage::new_rgb8(1280, 720);
/// let path = writer.write(61_042, 0, &frame)?;
/// assert!(path.ends_with("frame_01_01_042.png"));
/// # Ok::<(), vidsample::SampleError>(())
/// ```
#[derive(Debug)]
pub struct FrameWriter {
    output_dir: PathBuf,
}

impl FrameWriter {
    /// Create the output directory (and any missing parents) and return a
    /// writer rooted there.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::OutputUnwritable`] if the directory cannot be
    /// created.
    pub fn create<P: AsRef<Path>>(output_dir: P) -> Result<Self, SampleError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| SampleError::OutputUnwritable {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    /// The directory this writer outputs into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Encode `frame` as a PNG named after `timestamp_ms`.
    ///
    /// If the canonical name already exists on disk (duplicate-index
    /// sampling), the name is disambiguated with the sample ordinal:
    /// `frame_MM_SS_mmm_k<ordinal>.png`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::FrameEncodeFailed`] if encoding fails; the
    /// caller treats this as non-fatal.
    pub fn write(
        &self,
        timestamp_ms: u64,
        sample_ordinal: u64,
        frame: &DynamicImage,
    ) -> Result<PathBuf, SampleError> {
        let mut path = self.output_dir.join(frame_file_name(timestamp_ms));
        if path.exists() {
            path = self
                .output_dir
                .join(duplicate_file_name(timestamp_ms, sample_ordinal));
            debug!(
                "duplicate timestamp {timestamp_ms} ms, disambiguating as {}",
                path.display(),
            );
        }

        frame
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|error| SampleError::FrameEncodeFailed {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        Ok(path)
    }
}

/// Canonical file name for a frame at `timestamp_ms`.
///
/// Minutes are zero-padded to two digits but grow without capping past 99;
/// seconds and milliseconds stay within their units.
pub fn frame_file_name(timestamp_ms: u64) -> String {
    let minutes = timestamp_ms / 60_000;
    let seconds = (timestamp_ms / 1_000) % 60;
    let millis = timestamp_ms % 1_000;
    format!("frame_{minutes:02}_{seconds:02}_{millis:03}.png")
}

fn duplicate_file_name(timestamp_ms: u64, sample_ordinal: u64) -> String {
    let minutes = timestamp_ms / 60_000;
    let seconds = (timestamp_ms / 1_000) % 60;
    let millis = timestamp_ms % 1_000;
    format!("frame_{minutes:02}_{seconds:02}_{millis:03}_k{sample_ordinal}.png")
}

/// Parse a frame file name back into its timestamp in milliseconds.
///
/// Accepts both the canonical `frame_MM_SS_mmm.png` form and the
/// `_k<ordinal>`-suffixed duplicate form. Returns `None` for anything else.
pub fn parse_frame_timestamp(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix("frame_")?.strip_suffix(".png")?;

    let mut parts = rest.split('_');
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    let millis: u64 = parts.next()?.parse().ok()?;

    // An optional trailing duplicate marker, nothing beyond it.
    if let Some(extra) = parts.next() {
        let ordinal = extra.strip_prefix('k')?;
        if ordinal.parse::<u64>().is_err() || parts.next().is_some() {
            return None;
        }
    }

    if seconds >= 60 || millis >= 1_000 {
        return None;
    }

    Some(minutes * 60_000 + seconds * 1_000 + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_canonical_names() {
        assert_eq!(frame_file_name(0), "frame_00_00_000.png");
        assert_eq!(frame_file_name(1_000), "frame_00_01_000.png");
        assert_eq!(frame_file_name(61_042), "frame_01_01_042.png");
        assert_eq!(frame_file_name(59 * 60_000 + 59_999), "frame_59_59_999.png");
    }

    #[test]
    fn minutes_field_grows_past_two_digits() {
        // 100 minutes, 7 seconds, 5 ms.
        let name = frame_file_name(100 * 60_000 + 7_005);
        assert_eq!(name, "frame_100_07_005.png");
    }

    #[test]
    fn round_trips_through_parse() {
        for &ts in &[0_u64, 1, 999, 1_000, 59_999, 60_000, 61_042, 6_000_000] {
            let name = frame_file_name(ts);
            assert_eq!(parse_frame_timestamp(&name), Some(ts), "name {name}");
        }
    }

    #[test]
    fn parses_duplicate_suffix() {
        assert_eq!(
            parse_frame_timestamp("frame_00_02_500_k7.png"),
            Some(2_500),
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(parse_frame_timestamp("frame_00_02.png"), None);
        assert_eq!(parse_frame_timestamp("still_00_00_000.png"), None);
        assert_eq!(parse_frame_timestamp("frame_00_99_000.png"), None);
        assert_eq!(parse_frame_timestamp("frame_00_00_000.jpg"), None);
        assert_eq!(parse_frame_timestamp("frame_00_00_000_x1.png"), None);
        assert_eq!(parse_frame_timestamp("frame_aa_00_000.png"), None);
    }
}
