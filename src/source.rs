//! Video source handling.
//!
//! [`VideoSource`] opens a video file through FFmpeg, locates the best video
//! stream, and caches its [`VideoMetadata`]. Decoding happens through
//! [`FrameIterator`](crate::FrameIterator), obtained from
//! [`VideoSource::frames`].

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::{error::SampleError, iterator::FrameIterator, metadata::VideoMetadata};

/// An opened video file.
///
/// Created via [`VideoSource::open`]; holds the demuxer context and cached
/// metadata for the lifetime of one sampling run. The underlying FFmpeg
/// handle is released on drop, on every exit path.
///
/// # Example
///
/// ```no_run
/// use vidsample::VideoSource;
///
/// let source = VideoSource::open("input.mp4")?;
/// println!("native rate: {:.2} fps", source.metadata().native_fps);
/// # Ok::<(), vidsample::SampleError>(())
/// ```
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: VideoMetadata,
    /// Index of the best video stream.
    pub(crate) video_stream_index: usize,
    /// Path to the opened file (kept for error messages).
    pub(crate) file_path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for sampling.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`SampleError::SourceUnreadable`] if the file is missing, cannot be
    ///   demuxed, or its codec parameters cannot be read.
    /// - [`SampleError::EmptyOrInvalidSource`] if there is no video stream,
    ///   the estimated frame count is zero, or the native frame rate is not
    ///   positive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let file_path = path.as_ref().to_path_buf();

        // Safe to call multiple times.
        ffmpeg_next::init().map_err(|error| SampleError::SourceUnreadable {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context = ffmpeg_next::format::input(&file_path).map_err(|error| {
            SampleError::SourceUnreadable {
                path: file_path.clone(),
                reason: error.to_string(),
            }
        })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or_else(|| SampleError::EmptyOrInvalidSource {
                path: file_path.clone(),
                reason: "no video stream".to_string(),
            })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let stream = input_context
            .stream(video_stream_index)
            .expect("best() returned a valid index");

        // Prefer the average frame rate; fall back to the raw rate field for
        // containers that don't record an average.
        let frame_rate = stream.avg_frame_rate();
        let native_fps = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let codec_parameters = stream.parameters();
        let decoder_context = CodecContext::from_parameters(codec_parameters).map_err(|error| {
            SampleError::SourceUnreadable {
                path: file_path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            }
        })?;
        let video_decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| SampleError::SourceUnreadable {
                    path: file_path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let width = video_decoder.width();
        let height = video_decoder.height();
        let codec = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let total_frames = if native_fps > 0.0 {
            (duration.as_secs_f64() * native_fps) as u64
        } else {
            0
        };

        if native_fps <= 0.0 {
            return Err(SampleError::EmptyOrInvalidSource {
                path: file_path,
                reason: format!("frame rate is {native_fps}"),
            });
        }
        if total_frames == 0 {
            return Err(SampleError::EmptyOrInvalidSource {
                path: file_path,
                reason: "estimated frame count is zero".to_string(),
            });
        }

        Ok(Self {
            input_context,
            metadata: VideoMetadata {
                width,
                height,
                native_fps,
                total_frames,
                duration,
                codec,
            },
            video_stream_index,
            file_path,
        })
    }

    /// Get a reference to the cached metadata.
    ///
    /// Extracted once during [`open`](VideoSource::open); reading it costs no
    /// additional decoding.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Create a lazy decoder over the given source-frame indices.
    ///
    /// `indices` must be **sorted and deduplicated**; the iterator decodes
    /// forward through the stream exactly once. The iterator borrows this
    /// source mutably, so only one can be alive at a time.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::SourceUnreadable`] if a decoder or scaler
    /// cannot be set up for the stream.
    pub fn frames(&mut self, indices: Vec<u64>) -> Result<FrameIterator<'_>, SampleError> {
        FrameIterator::new(self, indices)
    }
}
