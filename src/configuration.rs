//! Pipeline configuration.
//!
//! [`PipelineOptions`] is a builder that threads the conversion settings
//! through [`MediaFile::pipeline`](crate::MediaFile::pipeline) without
//! widening its signature.
//!
//! # Example
//!
//! ```no_run
//! use framepeek::{MediaFile, PipelineOptions, ScalingAlgorithm, TargetFormat};
//!
//! let options = PipelineOptions::new()
//!     .with_target_format(TargetFormat::Rgba)
//!     .with_scaling(ScalingAlgorithm::Bicubic);
//!
//! let mut media = MediaFile::open("input.mp4")?;
//! let pipeline = media.pipeline(&options)?;
//! # Ok::<(), framepeek::FramepeekError>(())
//! ```

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::Flags as ScalingFlags;

/// Packed pixel layout that decoded frames are converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// Interleaved 8-bit R, G, B (3 bytes per pixel). Used for PPM output.
    #[default]
    Rgb24,
    /// Interleaved 8-bit R, G, B, A with opaque alpha (4 bytes per pixel).
    /// Used for GPU upload, which has no 3-byte texture format.
    Rgba,
}

impl TargetFormat {
    /// Bytes one pixel occupies in this layout.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TargetFormat::Rgb24 => 3,
            TargetFormat::Rgba => 4,
        }
    }

    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            TargetFormat::Rgb24 => Pixel::RGB24,
            TargetFormat::Rgba => Pixel::RGBA,
        }
    }
}

/// Interpolation used by the pixel-format converter.
///
/// Source and target sizes are identical, so this only affects chroma
/// upsampling of subsampled formats such as YUV 4:2:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingAlgorithm {
    /// Bilinear filtering. This is the default.
    #[default]
    Bilinear,
    /// Faster, lower-quality bilinear filtering.
    FastBilinear,
    /// Bicubic filtering.
    Bicubic,
    /// Nearest-neighbour sampling.
    Point,
}

impl ScalingAlgorithm {
    /// Parse an algorithm name as accepted on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "bilinear" => Some(ScalingAlgorithm::Bilinear),
            "fast-bilinear" | "fast_bilinear" | "fast" => Some(ScalingAlgorithm::FastBilinear),
            "bicubic" => Some(ScalingAlgorithm::Bicubic),
            "point" | "nearest" => Some(ScalingAlgorithm::Point),
            _ => None,
        }
    }

    pub(crate) fn to_ffmpeg_flags(self) -> ScalingFlags {
        match self {
            ScalingAlgorithm::Bilinear => ScalingFlags::BILINEAR,
            ScalingAlgorithm::FastBilinear => ScalingFlags::FAST_BILINEAR,
            ScalingAlgorithm::Bicubic => ScalingFlags::BICUBIC,
            ScalingAlgorithm::Point => ScalingFlags::POINT,
        }
    }
}

/// Settings for a [`FramePipeline`](crate::FramePipeline).
///
/// A default-constructed value converts to RGB24 with bilinear filtering.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub(crate) target_format: TargetFormat,
    pub(crate) scaling: ScalingAlgorithm,
}

impl PipelineOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the packed layout decoded frames are converted into.
    #[must_use]
    pub fn with_target_format(mut self, format: TargetFormat) -> Self {
        self.target_format = format;
        self
    }

    /// Set the converter's interpolation algorithm.
    #[must_use]
    pub fn with_scaling(mut self, scaling: ScalingAlgorithm) -> Self {
        self.scaling = scaling;
        self
    }

    /// The configured target format.
    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    /// The configured interpolation algorithm.
    pub fn scaling(&self) -> ScalingAlgorithm {
        self.scaling
    }
}
