//! Metadata without a pipeline.
//!
//! [`MediaProbe::probe`] opens the container, records the same
//! [`MediaMetadata`] that [`MediaFile::open`] caches, and closes the
//! container again before returning.

use std::path::Path;

use crate::{error::FramepeekError, media::MediaFile, metadata::MediaMetadata};

/// Reads container and video-stream metadata, then releases the file.
///
/// ```no_run
/// use framepeek::MediaProbe;
///
/// let metadata = MediaProbe::probe("input.mp4")?;
/// match &metadata.video {
///     Some(video) => println!("{}x{} {}", video.width, video.height, video.codec),
///     None => println!("{}: no video", metadata.format),
/// }
/// # Ok::<(), framepeek::FramepeekError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MediaProbe;

impl MediaProbe {
    /// Metadata of the file at `path`. A file without video is not an error
    /// here; its `video` field is `None`.
    ///
    /// # Errors
    ///
    /// [`FramepeekError::FileOpen`] when the path is unreadable or not a
    /// recognised container.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaMetadata, FramepeekError> {
        let MediaFile { metadata, .. } = MediaFile::open(path)?;
        Ok(metadata)
    }
}
