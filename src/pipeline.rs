//! Pull-based decode and convert loop.
//!
//! [`FramePipeline`] reads packets from the container, drops packets that
//! belong to other streams, feeds video packets to the decoder, and converts
//! every decoded frame into the reusable target buffer. Each call to
//! [`next_frame`](FramePipeline::next_frame) reads just enough packets to
//! produce one frame; nothing is buffered beyond that frame.
//!
//! # Example
//!
//! ```no_run
//! use framepeek::{MediaFile, PipelineOptions};
//!
//! let mut media = MediaFile::open("input.mp4")?;
//! let mut pipeline = media.pipeline(&PipelineOptions::new())?;
//!
//! while let Some(frame) = pipeline.next_frame()? {
//!     println!("{}x{} stride {}", frame.width(), frame.height(), frame.stride());
//! }
//! # Ok::<(), framepeek::FramepeekError>(())
//! ```

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder, frame::Video as VideoFrame,
};

use crate::configuration::PipelineOptions;
use crate::conversion::FrameConverter;
use crate::error::FramepeekError;
use crate::frame::FrameView;
use crate::media::MediaFile;
use crate::sink::{FrameSink, SinkControl};

/// Counters describing what a pipeline has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packets read from the container, from any stream.
    pub packets_read: u64,
    /// Packets dropped because they belong to another stream.
    pub packets_skipped: u64,
    /// Frames produced by the decoder and converted.
    pub frames_decoded: u64,
    /// Of `frames_decoded`, frames drained from the decoder after the end of
    /// input was reached.
    pub frames_flushed: u64,
    /// Frames handed to a [`FrameSink`] by [`FramePipeline::run`].
    pub frames_delivered: u64,
}

/// Decoder, converter and frame buffers for one video stream.
///
/// Borrows the [`MediaFile`] mutably for its lifetime. Dropping the pipeline
/// closes the decoder and frees both frame buffers.
///
/// The converter is created from the first decoded frame, since some
/// containers only reveal the pixel format and size once decoding starts.
pub struct FramePipeline<'a> {
    media: &'a mut MediaFile,
    decoder: VideoDecoder,
    converter: Option<FrameConverter>,
    options: PipelineOptions,
    stream_index: usize,
    decoded_frame: VideoFrame,
    summary: RunSummary,
    eof_sent: bool,
    done: bool,
}

impl<'a> FramePipeline<'a> {
    pub(crate) fn new(
        media: &'a mut MediaFile,
        stream_index: usize,
        options: &PipelineOptions,
    ) -> Result<Self, FramepeekError> {
        let stream = media
            .input_context
            .stream(stream_index)
            .ok_or(FramepeekError::NoVideoStream)?;
        let parameters = stream.parameters();
        let codec_name = parameters.id().name().to_string();

        let decoder_context = CodecContext::from_parameters(parameters)?;
        let decoder = decoder_context.decoder().video().map_err(|error| {
            FramepeekError::UnsupportedCodec {
                codec: codec_name.clone(),
                reason: error.to_string(),
            }
        })?;

        log::debug!(
            "Opened {codec_name} decoder for stream {stream_index}: {}x{} {:?} -> {:?}",
            decoder.width(),
            decoder.height(),
            decoder.format(),
            options.target_format(),
        );

        Ok(Self {
            media,
            decoder,
            converter: None,
            options: options.clone(),
            stream_index,
            decoded_frame: VideoFrame::empty(),
            summary: RunSummary::default(),
            eof_sent: false,
            done: false,
        })
    }

    /// Decode and convert the next frame of the video stream.
    ///
    /// Returns `Ok(None)` once the container is exhausted and the decoder has
    /// been drained. The returned view borrows the pipeline's converted
    /// buffer and is overwritten by the next call.
    ///
    /// # Errors
    ///
    /// Returns [`FramepeekError::VideoDecodeError`] if the decoder rejects a
    /// packet, [`FramepeekError::FfmpegError`] if reading the container fails
    /// for a reason other than end of file, and
    /// [`FramepeekError::ConversionError`] if conversion fails.
    pub fn next_frame(&mut self) -> Result<Option<FrameView<'_>>, FramepeekError> {
        if !self.advance()? {
            return Ok(None);
        }
        self.current_view().map(Some)
    }

    /// Pull frames into `sink` until the input ends or the sink asks to stop.
    ///
    /// A sink that reports [`FrameSink::wants_frames`] as `false` before the
    /// first frame causes no decoding at all.
    ///
    /// Returns the pipeline's counters after the last frame.
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> Result<RunSummary, FramepeekError> {
        while sink.wants_frames() && self.advance()? {
            let index = self.summary.frames_delivered + 1;
            let frame = self.current_view()?;
            let control = sink.consume(index, &frame)?;
            self.summary.frames_delivered = index;

            if control == SinkControl::Stop {
                log::debug!("Sink stopped the pipeline after {index} frame(s)");
                break;
            }
        }

        log::info!(
            "Pipeline finished: {} packet(s) read, {} skipped, {} frame(s) decoded ({} flushed), {} delivered",
            self.summary.packets_read,
            self.summary.packets_skipped,
            self.summary.frames_decoded,
            self.summary.frames_flushed,
            self.summary.frames_delivered,
        );

        Ok(self.summary)
    }

    /// Counters accumulated so far.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Width and height of the decoded video.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    /// Index of the stream being decoded.
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Whether the input is exhausted and the decoder drained.
    pub fn is_finished(&self) -> bool {
        self.done
    }

    fn current_view(&self) -> Result<FrameView<'_>, FramepeekError> {
        self.converter
            .as_ref()
            .ok_or_else(|| FramepeekError::ConversionError("no frame decoded yet".to_string()))?
            .view()
    }

    /// Convert the frame the decoder just produced, creating the converter
    /// on first use.
    fn convert_decoded(&mut self) -> Result<(), FramepeekError> {
        match self.converter.as_mut() {
            Some(converter) => converter.convert(&self.decoded_frame),
            None => {
                let mut converter = FrameConverter::for_frame(
                    &self.decoded_frame,
                    self.options.target_format(),
                    self.options.scaling(),
                )?;
                converter.convert(&self.decoded_frame)?;
                self.converter = Some(converter);
                Ok(())
            }
        }
    }

    /// Move the pipeline to the next converted frame.
    ///
    /// Returns `false` at end of stream.
    fn advance(&mut self) -> Result<bool, FramepeekError> {
        if self.done {
            return Ok(false);
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                self.convert_decoded()?;
                self.summary.frames_decoded += 1;
                if self.eof_sent {
                    self.summary.frames_flushed += 1;
                }
                return Ok(true);
            }

            if self.eof_sent {
                log::debug!(
                    "Decoder drained after {} frame(s)",
                    self.summary.frames_decoded
                );
                self.done = true;
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.media.input_context) {
                Ok(()) => {
                    self.summary.packets_read += 1;
                    if packet.stream() != self.stream_index {
                        self.summary.packets_skipped += 1;
                        continue;
                    }
                    self.decoder.send_packet(&packet).map_err(|error| {
                        FramepeekError::VideoDecodeError(format!(
                            "packet {} rejected by decoder: {error}",
                            self.summary.packets_read
                        ))
                    })?;
                }
                Err(FfmpegError::Eof) => {
                    log::debug!("End of input, flushing decoder");
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    self.done = true;
                    return Err(error.into());
                }
            }
        }
    }
}
