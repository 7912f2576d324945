//! Pixel-format conversion.
//!
//! [`FrameConverter`] owns the swscale context and the reusable converted
//! frame. Each decoded frame is converted in place into that single buffer at
//! identical width and height; nothing is scaled.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::Context as ScalingContext,
};

use crate::configuration::{ScalingAlgorithm, TargetFormat};
use crate::error::FramepeekError;
use crate::frame::FrameView;

/// Copy the pixel rows of a frame into a tightly-packed buffer.
///
/// Row padding beyond [`FrameView::row_len`] is dropped.
pub fn frame_to_buffer(frame: &FrameView<'_>) -> Vec<u8> {
    let row_len = frame.row_len();
    let height = frame.height() as usize;

    if frame.is_tightly_packed() {
        frame.data()[..row_len * height].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_len * height);
        for row in frame.rows() {
            buffer.extend_from_slice(row);
        }
        buffer
    }
}

/// Converts decoded frames from their source pixel format into a packed
/// [`TargetFormat`].
///
/// The converted frame is allocated once and overwritten on every call to
/// [`convert`](FrameConverter::convert).
pub struct FrameConverter {
    scaler: ScalingContext,
    converted: VideoFrame,
    source_format: Pixel,
    width: u32,
    height: u32,
    target: TargetFormat,
    scaling: ScalingAlgorithm,
}

impl FrameConverter {
    /// Create a converter for frames of the given source format and size.
    ///
    /// # Errors
    ///
    /// Returns [`FramepeekError::ConversionError`] if swscale does not support
    /// the source format.
    pub fn new(
        source_format: Pixel,
        width: u32,
        height: u32,
        target: TargetFormat,
        scaling: ScalingAlgorithm,
    ) -> Result<Self, FramepeekError> {
        let scaler = build_scaler(source_format, width, height, target, scaling)?;
        let converted = VideoFrame::new(target.to_ffmpeg_pixel(), width, height);

        log::debug!(
            "Created converter {source_format:?} -> {:?} at {width}x{height} ({scaling:?})",
            target.to_ffmpeg_pixel(),
        );

        Ok(Self {
            scaler,
            converted,
            source_format,
            width,
            height,
            target,
            scaling,
        })
    }

    /// Create a converter matching the format and size of `decoded`.
    ///
    /// # Errors
    ///
    /// Returns [`FramepeekError::ConversionError`] if swscale does not support
    /// the frame's format.
    pub fn for_frame(
        decoded: &VideoFrame,
        target: TargetFormat,
        scaling: ScalingAlgorithm,
    ) -> Result<Self, FramepeekError> {
        Self::new(
            decoded.format(),
            decoded.width(),
            decoded.height(),
            target,
            scaling,
        )
    }

    /// Convert one decoded frame into the reusable target buffer.
    ///
    /// If the decoder changes pixel format or size mid-stream, the swscale
    /// context and target buffer are rebuilt to match.
    pub fn convert(&mut self, decoded: &VideoFrame) -> Result<(), FramepeekError> {
        if decoded.format() != self.source_format
            || decoded.width() != self.width
            || decoded.height() != self.height
        {
            log::warn!(
                "Decoded frame changed from {:?} {}x{} to {:?} {}x{}, rebuilding converter",
                self.source_format,
                self.width,
                self.height,
                decoded.format(),
                decoded.width(),
                decoded.height(),
            );
            *self = Self::new(
                decoded.format(),
                decoded.width(),
                decoded.height(),
                self.target,
                self.scaling,
            )?;
        }

        self.scaler
            .run(decoded, &mut self.converted)
            .map_err(|error| FramepeekError::ConversionError(error.to_string()))
    }

    /// Borrow the most recently converted frame.
    pub fn view(&self) -> Result<FrameView<'_>, FramepeekError> {
        FrameView::new(
            self.converted.width(),
            self.converted.height(),
            self.converted.stride(0),
            self.target,
            self.converted.data(0),
        )
    }

    /// The packed layout frames are converted into.
    pub fn target_format(&self) -> TargetFormat {
        self.target
    }
}

fn build_scaler(
    source_format: Pixel,
    width: u32,
    height: u32,
    target: TargetFormat,
    scaling: ScalingAlgorithm,
) -> Result<ScalingContext, FramepeekError> {
    ScalingContext::get(
        source_format,
        width,
        height,
        target.to_ffmpeg_pixel(),
        width,
        height,
        scaling.to_ffmpeg_flags(),
    )
    .map_err(|error| {
        FramepeekError::ConversionError(format!(
            "cannot convert {source_format:?} {width}x{height} to {target:?}: {error}"
        ))
    })
}
