//! FramePipeline integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framepeek::{
    CountingSink, FrameSink, FrameView, FramepeekError, MediaFile, PipelineOptions,
    ScalingAlgorithm, SinkControl, TargetFormat,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn short_video_path() -> &'static str {
    "tests/fixtures/short_video.mp4"
}

fn audio_first_path() -> &'static str {
    "tests/fixtures/audio_first.mkv"
}

fn bframes_video_path() -> &'static str {
    "tests/fixtures/bframes_video.mp4"
}

// ── pull interface ─────────────────────────────────────────────────

#[test]
fn next_frame_decodes_every_frame() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");

    let mut frames = 0;
    while let Some(frame) = pipeline.next_frame().expect("Failed to decode") {
        assert_eq!((frame.width(), frame.height()), (320, 240));
        assert_eq!(frame.format(), TargetFormat::Rgb24);
        assert!(frame.stride() >= frame.row_len());
        frames += 1;
    }

    assert_eq!(frames, 50);
    assert!(pipeline.is_finished());
    assert_eq!(pipeline.summary().frames_decoded, 50);
}

#[test]
fn exhausted_pipeline_keeps_returning_none() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");

    while pipeline.next_frame().expect("Failed to decode").is_some() {}
    assert!(pipeline.next_frame().expect("Failed to decode").is_none());
    assert!(pipeline.next_frame().expect("Failed to decode").is_none());
    assert_eq!(pipeline.summary().frames_decoded, 3);
}

#[test]
fn frames_held_by_decoder_are_drained_at_end_of_input() {
    let path = bframes_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");

    let mut frames = 0;
    while pipeline.next_frame().expect("Failed to decode").is_some() {
        frames += 1;
    }

    let summary = pipeline.summary();
    assert_eq!(frames, 10);
    assert_eq!(summary.frames_decoded, 10);
    assert!(
        summary.frames_flushed >= 1,
        "expected reordered frames after end of input, got {summary:?}"
    );
}

#[test]
fn pipeline_reports_dimensions_and_stream() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");

    assert_eq!(pipeline.dimensions(), (160, 120));
    assert_eq!(pipeline.stream_index(), 0);
    assert!(!pipeline.is_finished());
}

// ── push interface ─────────────────────────────────────────────────

#[test]
fn run_counts_frames_and_packets() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut sink = CountingSink::new();
    let summary = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline")
        .run(&mut sink)
        .expect("Failed to run pipeline");

    assert_eq!(sink.frames(), 50);
    assert_eq!(summary.frames_decoded, 50);
    assert_eq!(summary.frames_delivered, 50);
    // The audio track's packets are read and dropped.
    assert!(summary.packets_skipped > 0);
    assert!(summary.packets_read >= summary.packets_skipped + 50);
}

#[test]
fn run_stops_when_sink_asks() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut sink = CountingSink::with_limit(4);
    let summary = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline")
        .run(&mut sink)
        .expect("Failed to run pipeline");

    assert_eq!(sink.frames(), 4);
    assert_eq!(summary.frames_delivered, 4);
    assert_eq!(summary.frames_decoded, 4);
}

#[test]
fn zero_limit_sink_decodes_nothing() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut sink = CountingSink::with_limit(0);
    let summary = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline")
        .run(&mut sink)
        .expect("Failed to run pipeline");

    assert_eq!(sink.frames(), 0);
    assert_eq!(summary.frames_decoded, 0);
    assert_eq!(summary.frames_delivered, 0);
}

struct IndexRecorder(Vec<u64>);

impl FrameSink for IndexRecorder {
    fn consume(
        &mut self,
        index: u64,
        _frame: &FrameView<'_>,
    ) -> Result<SinkControl, FramepeekError> {
        self.0.push(index);
        Ok(SinkControl::Continue)
    }
}

#[test]
fn sink_indices_are_one_based_and_contiguous() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut recorder = IndexRecorder(Vec::new());
    media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline")
        .run(&mut recorder)
        .expect("Failed to run pipeline");

    assert_eq!(recorder.0, vec![1, 2, 3]);
}

struct FailOnSecond;

impl FrameSink for FailOnSecond {
    fn consume(
        &mut self,
        index: u64,
        _frame: &FrameView<'_>,
    ) -> Result<SinkControl, FramepeekError> {
        if index == 2 {
            return Err(FramepeekError::ConversionError("sink refused".to_string()));
        }
        Ok(SinkControl::Continue)
    }
}

#[test]
fn sink_error_aborts_run() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");

    let result = pipeline.run(&mut FailOnSecond);
    assert!(matches!(result, Err(FramepeekError::ConversionError(_))));
    assert_eq!(pipeline.summary().frames_delivered, 1);
}

#[test]
fn audio_first_container_skips_audio_packets() {
    let path = audio_first_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");
    assert_eq!(pipeline.stream_index(), 1);

    let mut pipeline = pipeline;
    let summary = pipeline
        .run(&mut CountingSink::new())
        .expect("Failed to run pipeline");
    assert!(summary.frames_decoded > 0);
    assert!(summary.packets_skipped > 0);
}

// ── conversion options ────────────────────────────────────────────

#[test]
fn rgba_target_has_four_bytes_per_pixel() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let options = PipelineOptions::new().with_target_format(TargetFormat::Rgba);
    let mut pipeline = media.pipeline(&options).expect("Failed to build pipeline");

    let frame = pipeline
        .next_frame()
        .expect("Failed to decode")
        .expect("Expected a frame");
    assert_eq!(frame.format(), TargetFormat::Rgba);
    assert_eq!(frame.row_len(), 160 * 4);
    assert!(frame.row(0).chunks_exact(4).all(|pixel| pixel[3] == 255));
}

#[test]
fn every_scaling_algorithm_converts() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    for scaling in [
        ScalingAlgorithm::Bilinear,
        ScalingAlgorithm::FastBilinear,
        ScalingAlgorithm::Bicubic,
        ScalingAlgorithm::Point,
    ] {
        let mut media = MediaFile::open(path).expect("Failed to open fixture");
        let options = PipelineOptions::new().with_scaling(scaling);
        let mut pipeline = media.pipeline(&options).expect("Failed to build pipeline");
        let frame = pipeline
            .next_frame()
            .expect("Failed to decode")
            .expect("Expected a frame");
        assert_eq!((frame.width(), frame.height()), (160, 120), "{scaling:?}");
    }
}

#[test]
fn frame_converts_to_image() {
    let path = short_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut pipeline = media
        .pipeline(&PipelineOptions::new())
        .expect("Failed to build pipeline");
    let frame = pipeline
        .next_frame()
        .expect("Failed to decode")
        .expect("Expected a frame");

    let image = frame.to_image().expect("Failed to build image");
    assert_eq!((image.width(), image.height()), (160, 120));
    assert_eq!(image.to_rgb8().as_raw().len(), 160 * 120 * 3);
}
