//! Internal utility functions.
//!
//! Helpers for pixel-data copying and timestamp conversion shared by the
//! source and iterator modules.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3).
/// This strips the padding so the result can be passed directly to
/// [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        // No padding: copy the entire plane at once.
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Convert a frame number to a timestamp in the stream's time base, suitable
/// for FFmpeg seeking.
pub(crate) fn frame_number_to_stream_timestamp(
    frame_number: u64,
    native_fps: f64,
    time_base: Rational,
) -> i64 {
    let seconds = frame_number as f64 / native_fps;
    let duration = Duration::from_secs_f64(seconds);
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (duration.as_secs_f64() * denominator / numerator) as i64
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Rescale a PTS value to a source-frame number.
pub(crate) fn pts_to_frame_number(pts: i64, time_base: Rational, native_fps: f64) -> u64 {
    let seconds = pts_to_seconds(pts, time_base);
    (seconds * native_fps) as u64
}
