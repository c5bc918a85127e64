//! Frame resizing.
//!
//! Decoded frames arrive at the source resolution; when a resize target is
//! configured they are resampled to exactly that size before being written.
//! Lanczos3 is used for its anti-aliased quality in both directions —
//! sampling runs are decode-bound, so the filter cost is irrelevant.

use std::borrow::Cow;

use image::{DynamicImage, imageops::FilterType};

use crate::config::ResizeSpec;

/// Resize a decoded frame to the target dimensions, if any.
///
/// With no target the frame passes through borrowed — no copy is made. With
/// a target a new frame is resampled to exactly `width × height`, ignoring
/// the source aspect ratio.
///
/// Malformed targets never reach this function: [`ResizeSpec`] rejects them
/// at parse/validation time, before any frame is decoded.
pub fn resize_frame<'a>(
    frame: &'a DynamicImage,
    target: Option<&ResizeSpec>,
) -> Cow<'a, DynamicImage> {
    match target {
        None => Cow::Borrowed(frame),
        Some(spec) => Cow::Owned(frame.resize_exact(
            spec.width,
            spec.height,
            FilterType::Lanczos3,
        )),
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    fn solid_frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 80, 120])))
    }

    #[test]
    fn no_target_borrows_the_input() {
        let frame = solid_frame(64, 48);
        let out = resize_frame(&frame, None);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn resizes_to_exact_dimensions() {
        let frame = solid_frame(64, 48);
        let spec = ResizeSpec {
            width: 32,
            height: 18,
        };
        let out = resize_frame(&frame, Some(&spec));
        assert_eq!((out.width(), out.height()), (32, 18));
    }

    #[test]
    fn upscale_is_allowed() {
        let frame = solid_frame(16, 16);
        let spec = ResizeSpec {
            width: 128,
            height: 128,
        };
        let out = resize_frame(&frame, Some(&spec));
        assert_eq!((out.width(), out.height()), (128, 128));
    }
}
