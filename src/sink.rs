//! Frame consumers.
//!
//! A [`FrameSink`] receives each converted frame from
//! [`FramePipeline::run`](crate::FramePipeline::run) and decides whether the
//! pipeline keeps going.

use crate::error::FramepeekError;
use crate::frame::FrameView;

/// What the pipeline should do after a sink has consumed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    /// Decode the next frame.
    Continue,
    /// Stop; the sink wants no more frames.
    Stop,
}

/// Receives converted frames one at a time.
///
/// `index` is 1-based and counts frames delivered to this sink. The frame
/// view is only valid for the duration of the call.
///
/// # Example
///
/// ```no_run
/// use framepeek::{FrameSink, FrameView, FramepeekError, MediaFile, PipelineOptions, SinkControl};
///
/// struct FirstRowDigest(Vec<u8>);
///
/// impl FrameSink for FirstRowDigest {
///     fn consume(&mut self, _index: u64, frame: &FrameView<'_>) -> Result<SinkControl, FramepeekError> {
///         self.0.push(frame.row(0)[0]);
///         Ok(SinkControl::Continue)
///     }
/// }
///
/// let mut media = MediaFile::open("input.mp4")?;
/// let mut digest = FirstRowDigest(Vec::new());
/// media.pipeline(&PipelineOptions::new())?.run(&mut digest)?;
/// # Ok::<(), FramepeekError>(())
/// ```
pub trait FrameSink {
    /// Consume one frame.
    fn consume(&mut self, index: u64, frame: &FrameView<'_>)
    -> Result<SinkControl, FramepeekError>;

    /// Whether another frame should be decoded for this sink. Checked before
    /// every frame, including the first.
    fn wants_frames(&self) -> bool {
        true
    }
}

/// A sink that only counts frames, optionally up to a limit.
#[derive(Debug, Clone, Default)]
pub struct CountingSink {
    frames: u64,
    limit: Option<u64>,
    last_dimensions: Option<(u32, u32)>,
}

impl CountingSink {
    /// Count every frame until the input ends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count frames and stop after `limit` of them.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Number of frames consumed.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Dimensions of the most recent frame.
    pub fn last_dimensions(&self) -> Option<(u32, u32)> {
        self.last_dimensions
    }
}

impl FrameSink for CountingSink {
    fn consume(
        &mut self,
        _index: u64,
        frame: &FrameView<'_>,
    ) -> Result<SinkControl, FramepeekError> {
        self.frames += 1;
        self.last_dimensions = Some((frame.width(), frame.height()));

        if self.wants_frames() {
            Ok(SinkControl::Continue)
        } else {
            Ok(SinkControl::Stop)
        }
    }

    fn wants_frames(&self) -> bool {
        self.limit.is_none_or(|limit| self.frames < limit)
    }
}
