//! Binary PPM (`P6`) output.
//!
//! A PPM file is a plain-text header `P6\n<width> <height>\n255\n` followed by
//! the raw interleaved RGB bytes of every scanline, top to bottom, with no
//! padding. [`PpmSink`] writes the first N frames of a pipeline as
//! `frame1.ppm`, `frame2.ppm`, ... in an output directory.

use std::{
    fs::File,
    io::{BufWriter, Error as IoError, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::configuration::TargetFormat;
use crate::error::FramepeekError;
use crate::frame::FrameView;
use crate::sink::{FrameSink, SinkControl};

/// Number of frames saved when no limit is given.
pub const DEFAULT_FRAME_LIMIT: u64 = 5;

/// Maximum sample value written in every header.
const MAX_COLOR_VALUE: u32 = 255;

/// The header bytes for a frame of the given size.
pub fn ppm_header(width: u32, height: u32) -> String {
    format!("P6\n{width} {height}\n{MAX_COLOR_VALUE}\n")
}

/// File name for the frame at 1-based position `index`.
pub fn ppm_file_name(index: u64) -> String {
    format!("frame{index}.ppm")
}

/// Serialize an RGB24 frame as binary PPM.
///
/// Each scanline contributes exactly `width * 3` bytes, read from the row's
/// offset `y * stride`; padding between rows is never written.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidInput`] for frames that are not RGB24, or any
/// error from the writer.
pub fn write_ppm<W: Write>(mut writer: W, frame: &FrameView<'_>) -> Result<(), IoError> {
    if frame.format() != TargetFormat::Rgb24 {
        return Err(IoError::new(
            ErrorKind::InvalidInput,
            format!("PPM output requires RGB24 frames, got {:?}", frame.format()),
        ));
    }

    writer.write_all(ppm_header(frame.width(), frame.height()).as_bytes())?;
    for row in frame.rows() {
        writer.write_all(row)?;
    }
    writer.flush()
}

/// Saves the first `limit` frames it receives as numbered PPM files.
#[derive(Debug, Clone)]
pub struct PpmSink {
    directory: PathBuf,
    limit: u64,
    written: Vec<PathBuf>,
}

impl PpmSink {
    /// Save up to `limit` frames into `directory`, which must exist.
    pub fn new<P: AsRef<Path>>(directory: P, limit: u64) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            limit,
            written: Vec::new(),
        }
    }

    /// Paths of the files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// The configured frame limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Path a frame at 1-based `index` is written to.
    pub fn path_for(&self, index: u64) -> PathBuf {
        self.directory.join(ppm_file_name(index))
    }
}

impl FrameSink for PpmSink {
    fn consume(
        &mut self,
        index: u64,
        frame: &FrameView<'_>,
    ) -> Result<SinkControl, FramepeekError> {
        if index > self.limit {
            return Ok(SinkControl::Stop);
        }

        let path = self.path_for(index);
        let file = File::create(&path)?;
        write_ppm(BufWriter::new(file), frame)?;
        log::debug!(
            "Saved frame {index} ({}x{}) -> {}",
            frame.width(),
            frame.height(),
            path.display()
        );
        self.written.push(path);

        if index >= self.limit {
            Ok(SinkControl::Stop)
        } else {
            Ok(SinkControl::Continue)
        }
    }

    fn wants_frames(&self) -> bool {
        (self.written.len() as u64) < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, stride: usize) -> Vec<u8> {
        let mut data = vec![0xAB; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize * 3 {
                data[y * stride + x] = (y * 31 + x) as u8;
            }
        }
        data
    }

    #[test]
    fn header_format() {
        assert_eq!(ppm_header(640, 480), "P6\n640 480\n255\n");
    }

    #[test]
    fn file_names_are_one_based() {
        assert_eq!(ppm_file_name(1), "frame1.ppm");
        assert_eq!(ppm_file_name(12), "frame12.ppm");
    }

    #[test]
    fn writes_header_then_rows_without_padding() {
        let data = gradient(3, 2, 16);
        let frame = FrameView::new(3, 2, 16, TargetFormat::Rgb24, &data).unwrap();

        let mut output = Vec::new();
        write_ppm(&mut output, &frame).unwrap();

        let header = b"P6\n3 2\n255\n";
        assert_eq!(&output[..header.len()], header);
        assert_eq!(output.len(), header.len() + 3 * 2 * 3);
        assert_eq!(&output[header.len()..header.len() + 9], &data[..9]);
        assert_eq!(&output[header.len() + 9..], &data[16..25]);
        assert!(!output[header.len()..].contains(&0xAB));
    }

    #[test]
    fn rejects_rgba_frames() {
        let data = vec![0u8; 16];
        let frame = FrameView::new(2, 2, 8, TargetFormat::Rgba, &data).unwrap();
        let error = write_ppm(Vec::new(), &frame).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn sink_writes_up_to_limit_then_stops() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let data = gradient(4, 4, 12);
        let frame = FrameView::new(4, 4, 12, TargetFormat::Rgb24, &data).unwrap();
        let mut sink = PpmSink::new(directory.path(), 2);

        assert!(sink.wants_frames());
        assert_eq!(sink.consume(1, &frame).unwrap(), SinkControl::Continue);
        assert_eq!(sink.consume(2, &frame).unwrap(), SinkControl::Stop);
        assert!(!sink.wants_frames());
        assert_eq!(sink.consume(3, &frame).unwrap(), SinkControl::Stop);

        assert_eq!(sink.written().len(), 2);
        assert!(directory.path().join("frame1.ppm").exists());
        assert!(directory.path().join("frame2.ppm").exists());
        assert!(!directory.path().join("frame3.ppm").exists());

        let bytes = std::fs::read(directory.path().join("frame2.ppm")).unwrap();
        assert_eq!(bytes.len(), ppm_header(4, 4).len() + 4 * 4 * 3);
    }

    #[test]
    fn zero_limit_writes_nothing() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let data = gradient(1, 1, 3);
        let frame = FrameView::new(1, 1, 3, TargetFormat::Rgb24, &data).unwrap();
        let mut sink = PpmSink::new(directory.path(), 0);

        assert!(!sink.wants_frames());
        assert_eq!(sink.consume(1, &frame).unwrap(), SinkControl::Stop);
        assert!(sink.written().is_empty());
        assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let data = gradient(1, 1, 3);
        let frame = FrameView::new(1, 1, 3, TargetFormat::Rgb24, &data).unwrap();
        let mut sink = PpmSink::new(directory.path().join("missing"), 5);

        let error = sink.consume(1, &frame).unwrap_err();
        assert!(matches!(error, FramepeekError::IoError(_)));
    }
}
