//! Lazy, pull-based frame decoding.
//!
//! [`FrameIterator`] decodes frames on demand — each call to
//! [`next()`](Iterator::next) reads just enough packets to produce the next
//! requested frame, so a sampling run never buffers more than one frame. A
//! decode failure at one index is reported as an `Err` item and iteration
//! continues, so one damaged frame cannot poison the rest of the run.
//!
//! Create a `FrameIterator` via [`VideoSource::frames`](crate::VideoSource::frames).

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};
use log::warn;

use crate::error::SampleError;
use crate::source::VideoSource;
use crate::utilities;

/// A lazy iterator over decoded video frames.
///
/// Yields `(source_index, image)` pairs for each requested index, in order.
/// Indices that cannot be decoded produce an `Err` item and are then passed
/// over. The iterator borrows the [`VideoSource`] mutably; dropping it
/// releases the borrow.
pub struct FrameIterator<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    /// Sorted, deduplicated frame indices to yield.
    target_frames: Vec<u64>,
    /// Index into `target_frames` pointing to the next frame to yield.
    target_index: usize,
    time_base: Rational,
    native_fps: f64,
    width: u32,
    height: u32,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl<'a> FrameIterator<'a> {
    /// Create a new iterator over the given frame indices.
    ///
    /// `target_frames` must be sorted and deduplicated. The iterator seeks
    /// to the first requested frame and then decodes forward.
    pub(crate) fn new(
        source: &'a mut VideoSource,
        target_frames: Vec<u64>,
    ) -> Result<Self, SampleError> {
        let video_stream_index = source.video_stream_index;
        let native_fps = source.metadata.native_fps;
        let width = source.metadata.width;
        let height = source.metadata.height;

        let stream = source
            .input_context
            .stream(video_stream_index)
            .expect("stream index was validated at open");
        let time_base = stream.time_base();
        let codec_parameters = stream.parameters();

        let setup_error = |error: FfmpegError| SampleError::SourceUnreadable {
            path: source.file_path.clone(),
            reason: format!("Failed to set up frame decoding: {error}"),
        };

        let decoder_context = CodecContext::from_parameters(codec_parameters).map_err(setup_error)?;
        let decoder = decoder_context.decoder().video().map_err(setup_error)?;

        // Convert whatever the codec outputs to packed RGB24 at the source
        // resolution; any user-facing resize happens later in the pipeline.
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(setup_error)?;

        // Seek to the nearest keyframe before the first requested frame;
        // decoding then rolls forward to the exact target.
        if let Some(&first) = target_frames.first() {
            let first_timestamp =
                utilities::frame_number_to_stream_timestamp(first, native_fps, time_base);
            let _ = source.input_context.seek(first_timestamp, ..first_timestamp);
        }

        Ok(Self {
            source,
            decoder,
            scaler,
            video_stream_index,
            target_frames,
            target_index: 0,
            time_base,
            native_fps,
            width,
            height,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Scale and convert the current `decoded_frame` to a `DynamicImage`.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, String> {
        self.scaler
            .run(&self.decoded_frame, &mut self.rgb_frame)
            .map_err(|error| error.to_string())?;

        let buffer = utilities::frame_to_rgb_buffer(&self.rgb_frame, self.width, self.height);
        let rgb_image = RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| "decoded frame data has unexpected size".to_string())?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<(u64, DynamicImage), SampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.target_index >= self.target_frames.len() {
            return None;
        }

        loop {
            // Drain any frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let pts = self.decoded_frame.pts().unwrap_or(0);
                let current_frame =
                    utilities::pts_to_frame_number(pts, self.time_base, self.native_fps);

                // Skip targets the stream has already passed; those indices
                // simply never appear and the pipeline counts them skipped.
                while self.target_index < self.target_frames.len()
                    && self.target_frames[self.target_index] < current_frame
                {
                    self.target_index += 1;
                }

                if self.target_index >= self.target_frames.len() {
                    self.done = true;
                    return None;
                }

                if current_frame == self.target_frames[self.target_index] {
                    self.target_index += 1;
                    return Some(match self.convert_current_frame() {
                        Ok(image) => Ok((current_frame, image)),
                        Err(reason) => Err(SampleError::FrameDecodeFailed {
                            index: current_frame,
                            reason,
                        }),
                    });
                }

                // Not a target; keep draining.
                continue;
            }

            // Decoder is empty. Feed it more packets.
            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            // One bad packet must not end the run; later
                            // packets usually decode fine.
                            warn!("skipping undecodable packet: {error}");
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        warn!("decoder rejected EOF flush: {error}");
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    // Transient read error; try the next packet.
                    warn!("packet read failed, continuing: {error}");
                }
            }
        }
    }
}
