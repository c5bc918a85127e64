//! Fatal-path behaviour of the sampling pipeline.
//!
//! None of these tests need fixture media: they exercise the validation and
//! open ordering that must fail before any decoding happens.

use vidsample::{FrameSampler, ResizeSpec, SampleError, SampleOptions};

#[test]
fn invalid_fps_fails_before_anything_else() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    let sampler = FrameSampler::new(
        "does_not_matter.mp4",
        &output,
        SampleOptions::new().with_target_fps(0.0),
    );
    let error = sampler.run().unwrap_err();

    assert!(matches!(error, SampleError::InvalidParameters(_)));
    // Parameters are checked before the source or output are touched.
    assert!(!output.exists());
}

#[test]
fn zero_dimension_resize_fails_before_the_source_opens() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    // Bypass ResizeSpec parsing to prove validate() catches direct
    // construction too.
    let options = SampleOptions::new().with_resize(Some(ResizeSpec {
        width: 0,
        height: 480,
    }));
    let error = FrameSampler::new("missing.mp4", &output, options)
        .run()
        .unwrap_err();

    assert!(matches!(error, SampleError::InvalidParameters(_)));
    assert!(!output.exists());
}

#[test]
fn missing_source_is_unreadable_and_creates_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    let sampler = FrameSampler::new(
        "this_file_does_not_exist.mp4",
        &output,
        SampleOptions::new(),
    );
    let error = sampler.run().unwrap_err();

    assert!(
        matches!(error, SampleError::SourceUnreadable { .. }),
        "got {error:?}",
    );
    assert!(error.is_fatal());
    assert!(!output.exists(), "no output directory may be created");
}

#[test]
fn garbage_source_is_rejected() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let garbage = temporary_directory.path().join("garbage.mp4");
    std::fs::write(&garbage, b"this is not a media file").expect("Failed to write garbage");

    let output = temporary_directory.path().join("frames");
    let error = FrameSampler::new(&garbage, &output, SampleOptions::new())
        .run()
        .unwrap_err();

    assert!(
        matches!(
            error,
            SampleError::SourceUnreadable { .. } | SampleError::EmptyOrInvalidSource { .. },
        ),
        "got {error:?}",
    );
    assert!(!output.exists());
}

#[test]
fn error_messages_identify_the_condition() {
    let error = FrameSampler::new(
        "nope.mp4",
        "frames_out",
        SampleOptions::new().with_target_fps(-2.0),
    )
    .run()
    .unwrap_err();

    let message = error.to_string();
    assert!(
        message.contains("Invalid sampling parameters"),
        "message should name the fatal condition: {message}",
    );
}
