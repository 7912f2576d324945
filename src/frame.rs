//! Borrowed view of a converted frame.
//!
//! [`FrameView`] is what the pipeline hands to outputs: a packed pixel buffer
//! with its width, height, stride and layout. It can only be built through
//! [`FrameView::new`], which checks that the declared stride and buffer
//! length cover every scanline, so writers may index rows without further
//! bounds reasoning.

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::configuration::TargetFormat;
use crate::error::FramepeekError;

/// A converted frame borrowed from the pipeline's reusable buffer.
///
/// The view is valid until the next call to
/// [`FramePipeline::next_frame`](crate::FramePipeline::next_frame), which
/// overwrites the buffer in place.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    width: u32,
    height: u32,
    stride: usize,
    format: TargetFormat,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Wrap a pixel buffer, checking that its layout is consistent.
    ///
    /// # Errors
    ///
    /// Returns [`FramepeekError::InvalidFrameLayout`] if `stride` is shorter
    /// than one row of pixels, or `data` ends before the last row does.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        format: TargetFormat,
        data: &'a [u8],
    ) -> Result<Self, FramepeekError> {
        let row_len = width as usize * format.bytes_per_pixel();
        let required = if height == 0 {
            0
        } else {
            stride * (height as usize - 1) + row_len
        };

        if stride < row_len || data.len() < required {
            return Err(FramepeekError::InvalidFrameLayout {
                width,
                height,
                stride,
                required: required.max(row_len * height as usize),
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte distance between the starts of consecutive scanlines.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed layout of the pixels.
    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// The raw buffer, including any per-row padding.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of meaningful bytes in one scanline.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Whether rows follow each other without padding.
    pub fn is_tightly_packed(&self) -> bool {
        self.stride == self.row_len()
    }

    /// Scanline `y`, exactly [`row_len`](FrameView::row_len) bytes long.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(y < self.height, "row {y} out of range for height {}", self.height);
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_len()]
    }

    /// Iterate over every scanline from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Copy the pixels into an owned [`DynamicImage`].
    pub fn to_image(&self) -> Result<DynamicImage, FramepeekError> {
        let buffer = crate::conversion::frame_to_buffer(self);
        let image = match self.format {
            TargetFormat::Rgb24 => {
                RgbImage::from_raw(self.width, self.height, buffer).map(DynamicImage::ImageRgb8)
            }
            TargetFormat::Rgba => {
                RgbaImage::from_raw(self.width, self.height, buffer).map(DynamicImage::ImageRgba8)
            }
        };
        image.ok_or_else(|| {
            FramepeekError::ConversionError(
                "Failed to construct image from converted frame data".to_string(),
            )
        })
    }
}
