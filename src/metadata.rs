//! Media metadata types.
//!
//! This module defines the metadata structures returned by
//! [`MediaFile::metadata`](crate::MediaFile::metadata). Metadata is captured
//! once when the file is opened and cached for the lifetime of the
//! [`MediaFile`](crate::MediaFile).

use std::time::Duration;

/// Container-level metadata plus the selected video stream.
///
/// # Example
///
/// ```no_run
/// use framepeek::MediaFile;
///
/// let media = MediaFile::open("input.mp4").unwrap();
/// let metadata = media.metadata();
/// println!("Format: {}, duration: {:?}", metadata.format, metadata.duration);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// The first video stream of the container, if any.
    pub video: Option<VideoMetadata>,
    /// Total number of streams the container declares.
    pub stream_count: usize,
    /// Total duration of the media file (zero when unknown).
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
}

/// Metadata for the selected video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Frame count declared by the container, or estimated from duration and
    /// frame rate when the container does not declare one.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`, `"vp9"`).
    pub codec: String,
    /// Source pixel format as reported by the decoder (e.g. `"YUV420P"`).
    pub pixel_format_name: Option<String>,
    /// Index of this stream within the container.
    pub stream_index: usize,
}

impl VideoMetadata {
    /// Number of bytes one RGB24 frame of this stream occupies when packed.
    pub fn rgb_frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}
