//! Core [`MediaFile`] implementation.
//!
//! `MediaFile` is the main entry point for the crate. It opens a media
//! container, selects its first video stream, caches metadata, and builds the
//! [`FramePipeline`] that decodes and converts that stream.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{context::Input, stream::Stream},
    media::Type,
};

use crate::{
    configuration::PipelineOptions,
    error::FramepeekError,
    metadata::{MediaMetadata, VideoMetadata},
    pipeline::FramePipeline,
};

/// An opened media container.
///
/// Created via [`MediaFile::open`]. The demuxer context is closed when the
/// value is dropped, on every exit path.
///
/// # Example
///
/// ```no_run
/// use framepeek::{MediaFile, PipelineOptions, PpmSink};
///
/// let mut media = MediaFile::open("input.mp4")?;
/// let mut pipeline = media.pipeline(&PipelineOptions::new())?;
/// let mut sink = PpmSink::new(".", 5);
/// pipeline.run(&mut sink)?;
/// # Ok::<(), framepeek::FramepeekError>(())
/// ```
pub struct MediaFile {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata captured at open time.
    pub(crate) metadata: MediaMetadata,
    /// Index of the first stream classified as video, if any.
    pub(crate) video_stream_index: Option<usize>,
    /// Path to the opened media file.
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media file and probe its streams.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, reads stream
    /// information, and records the first stream whose media type is video.
    /// A container without video opens successfully; building a pipeline from
    /// it fails with [`FramepeekError::NoVideoStream`].
    ///
    /// # Errors
    ///
    /// Returns [`FramepeekError::FileOpen`] if the path cannot be read or the
    /// container format is not recognised.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramepeekError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| FramepeekError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        // `input` opens the container and reads stream information.
        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramepeekError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        // Linear scan: the first declared video stream wins, not FFmpeg's
        // "best" stream.
        let video_stream_index = input_context
            .streams()
            .find(|stream| stream.parameters().medium() == Type::Video)
            .map(|stream| stream.index());

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let video = video_stream_index
            .and_then(|index| input_context.stream(index))
            .map(|stream| read_video_metadata(&stream, duration));

        let metadata = MediaMetadata {
            video,
            stream_count: input_context.nb_streams() as usize,
            duration,
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened media file: {} (format={}, duration={:.2}s, streams={})",
            file_path.display(),
            metadata.format,
            metadata.duration.as_secs_f64(),
            metadata.stream_count,
        );

        match &metadata.video {
            Some(video) => log::debug!(
                "Selected video stream: index={}, {}x{}, {:.2} fps, codec={}, ~{} frames",
                video.stream_index,
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
                video.frame_count,
            ),
            None => log::warn!("No video stream in {}", file_path.display()),
        }

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            file_path,
        })
    }

    /// Get a reference to the cached media metadata.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Print FFmpeg's description of the container and its streams to stderr.
    pub fn dump_format(&self) {
        crate::ffmpeg::dump_input(&self.input_context, &self.file_path);
    }

    /// Build a [`FramePipeline`] for the selected video stream.
    ///
    /// Finds and opens a decoder for the stream's codec. No packet is read
    /// yet; the converter is set up from the first decoded frame.
    ///
    /// # Errors
    ///
    /// - [`FramepeekError::NoVideoStream`] if the container has no video.
    /// - [`FramepeekError::UnsupportedCodec`] if no decoder matches the codec
    ///   or the decoder fails to open.
    pub fn pipeline(
        &mut self,
        options: &PipelineOptions,
    ) -> Result<FramePipeline<'_>, FramepeekError> {
        let video_stream_index = self
            .video_stream_index
            .ok_or(FramepeekError::NoVideoStream)?;
        FramePipeline::new(self, video_stream_index, options)
    }
}

/// Capture metadata for one video stream.
///
/// Opening a decoder here is best-effort: an unsupported codec still yields
/// dimensions from the stream parameters, and the failure is reported later
/// by [`MediaFile::pipeline`].
fn read_video_metadata(stream: &Stream<'_>, duration: Duration) -> VideoMetadata {
    let parameters = stream.parameters();
    let codec_id = parameters.id();

    // SAFETY: `parameters` borrows the stream's live AVCodecParameters.
    let (raw_width, raw_height) = unsafe {
        let raw = parameters.as_ptr();
        ((*raw).width.max(0) as u32, (*raw).height.max(0) as u32)
    };

    let decoder = CodecContext::from_parameters(parameters)
        .and_then(|context| context.decoder().video());

    let (width, height, codec, pixel_format_name) = match &decoder {
        Ok(decoder) => {
            let codec = decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| codec_id.name().to_string());
            let pixel_format_name = {
                let name = format!("{:?}", decoder.format());
                if name == "None" { None } else { Some(name) }
            };
            (decoder.width(), decoder.height(), codec, pixel_format_name)
        }
        Err(error) => {
            log::warn!(
                "Could not open decoder for stream {} ({}): {error}",
                stream.index(),
                codec_id.name(),
            );
            (raw_width, raw_height, codec_id.name().to_string(), None)
        }
    };

    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 && frame_rate.numerator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        let rate = stream.rate();
        if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        }
    };

    let frame_count = if stream.frames() > 0 {
        stream.frames() as u64
    } else if frames_per_second > 0.0 {
        (duration.as_secs_f64() * frames_per_second) as u64
    } else {
        0
    };

    VideoMetadata {
        width,
        height,
        frames_per_second,
        frame_count,
        codec,
        pixel_format_name,
        stream_index: stream.index(),
    }
}
