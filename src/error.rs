//! Error types for the `framepeek` crate.
//!
//! This module defines [`FramepeekError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry the file path, codec
//! name, or upstream message needed to diagnose a failed run.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framepeek` operations.
///
/// Every public method that can fail returns `Result<T, FramepeekError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramepeekError {
    /// The media file could not be opened or its container was not
    /// recognised.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// No decoder matches the video stream's codec, or it failed to open.
    #[error("Unsupported codec {codec}: {reason}")]
    UnsupportedCodec {
        /// Codec identifier name reported by the container.
        codec: String,
        /// Underlying reason from FFmpeg.
        reason: String,
    },

    /// A video packet could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The pixel-format converter could not be created or run.
    #[error("Pixel format conversion failed: {0}")]
    ConversionError(String),

    /// A frame buffer's declared layout does not cover its pixel data.
    #[error(
        "Invalid frame layout: {width}x{height} with stride {stride} needs {required} bytes, buffer has {actual}"
    )]
    InvalidFrameLayout {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Declared byte distance between scanlines.
        stride: usize,
        /// Minimum number of bytes the layout requires.
        required: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while writing frames or creating directories.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while decoding the overlay image.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The window, GPU surface, or renderer could not be set up or used.
    #[cfg(feature = "display")]
    #[error("Display error: {0}")]
    DisplayError(String),
}

impl From<FfmpegError> for FramepeekError {
    fn from(error: FfmpegError) -> Self {
        FramepeekError::FfmpegError(error.to_string())
    }
}
