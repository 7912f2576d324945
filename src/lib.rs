//! # framepeek
//!
//! Decode the video stream of a media file frame by frame, convert each frame
//! to packed RGB, and hand it to a consumer: numbered PPM images on disk or a
//! window on screen.
//!
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Save the First Frames as PPM
//!
//! ```no_run
//! use framepeek::{DEFAULT_FRAME_LIMIT, MediaFile, PipelineOptions, PpmSink};
//!
//! let mut media = MediaFile::open("input.mp4")?;
//! let mut sink = PpmSink::new(".", DEFAULT_FRAME_LIMIT);
//! let summary = media.pipeline(&PipelineOptions::new())?.run(&mut sink)?;
//! println!("wrote {} frame(s)", summary.frames_delivered);
//! # Ok::<(), framepeek::FramepeekError>(())
//! ```
//!
//! ### Pull Frames Yourself
//!
//! ```no_run
//! use framepeek::{MediaFile, PipelineOptions};
//!
//! let mut media = MediaFile::open("input.mp4")?;
//! let mut pipeline = media.pipeline(&PipelineOptions::new())?;
//! while let Some(frame) = pipeline.next_frame()? {
//!     let first_pixel = &frame.row(0)[..3];
//!     println!("{first_pixel:?}");
//! }
//! # Ok::<(), framepeek::FramepeekError>(())
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `display` | `run_display()` presents frames in a window via winit and wgpu (on by default) |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod conversion;
#[cfg(feature = "display")]
pub mod display;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod ppm;
pub mod probe;
pub mod sink;

pub use configuration::{PipelineOptions, ScalingAlgorithm, TargetFormat};
#[cfg(feature = "display")]
pub use display::{DisplayOptions, DisplaySummary, run_display};
pub use error::FramepeekError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use frame::FrameView;
pub use media::MediaFile;
pub use metadata::{MediaMetadata, VideoMetadata};
pub use pipeline::{FramePipeline, RunSummary};
pub use ppm::{DEFAULT_FRAME_LIMIT, PpmSink, ppm_file_name, ppm_header, write_ppm};
pub use probe::MediaProbe;
pub use sink::{CountingSink, FrameSink, SinkControl};
