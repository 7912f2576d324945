//! Control over what libav* itself writes to stderr.
//!
//! FFmpeg logs through its own callback, which the `log` facade never sees.
//! `--log-level` on the command line ends up in [`set_ffmpeg_log_level`];
//! `--dump` ends up in [`MediaFile::dump_format`](crate::MediaFile::dump_format).
//!
//! ```no_run
//! use framepeek::{FfmpegLogLevel, MediaFile};
//!
//! framepeek::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let media = MediaFile::open("input.mp4")?;
//! media.dump_format();
//! # Ok::<(), framepeek::FramepeekError>(())
//! ```

use std::path::Path;

use ffmpeg_next::{format::context::Input, util::log::Level};

/// Threshold for libav* console messages, quietest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Nothing.
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's own default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

/// Every level with its libav* counterpart and the name `--log-level` takes.
const LEVELS: [(FfmpegLogLevel, Level, &str); 9] = [
    (FfmpegLogLevel::Quiet, Level::Quiet, "quiet"),
    (FfmpegLogLevel::Panic, Level::Panic, "panic"),
    (FfmpegLogLevel::Fatal, Level::Fatal, "fatal"),
    (FfmpegLogLevel::Error, Level::Error, "error"),
    (FfmpegLogLevel::Warning, Level::Warning, "warning"),
    (FfmpegLogLevel::Info, Level::Info, "info"),
    (FfmpegLogLevel::Verbose, Level::Verbose, "verbose"),
    (FfmpegLogLevel::Debug, Level::Debug, "debug"),
    (FfmpegLogLevel::Trace, Level::Trace, "trace"),
];

impl FfmpegLogLevel {
    /// Look a level up by name, ignoring case. `warn` is an alias for
    /// `warning`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        let value = if value == "warn" { "warning" } else { value.as_str() };
        LEVELS
            .iter()
            .find(|(_, _, name)| *name == value)
            .map(|(level, _, _)| *level)
    }

    /// Lower-case name, as accepted by [`FfmpegLogLevel::parse`].
    pub fn name(self) -> &'static str {
        LEVELS
            .iter()
            .find(|(level, _, _)| *level == self)
            .map_or("warning", |(_, _, name)| *name)
    }

    fn to_ffmpeg_level(self) -> Level {
        LEVELS
            .iter()
            .find(|(level, _, _)| *level == self)
            .map_or(Level::Warning, |(_, ffmpeg_level, _)| *ffmpeg_level)
    }

    fn from_ffmpeg_level(ffmpeg_level: Level) -> Option<Self> {
        LEVELS
            .iter()
            .find(|(_, candidate, _)| *candidate == ffmpeg_level)
            .map(|(level, _, _)| *level)
    }
}

/// Change the threshold for libav* console output, process-wide.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    log::debug!("FFmpeg log level -> {}", level.name());
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// The current libav* threshold, or `None` if libav* reports a value
/// outside the known levels.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .and_then(FfmpegLogLevel::from_ffmpeg_level)
}

/// Print FFmpeg's description of an opened container to stderr.
pub(crate) fn dump_input(input: &Input, path: &Path) {
    let url = path.to_string_lossy();
    ffmpeg_next::format::context::input::dump(input, 0, Some(url.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::FfmpegLogLevel;

    #[test]
    fn parse_log_level_names() {
        assert_eq!(FfmpegLogLevel::parse("quiet"), Some(FfmpegLogLevel::Quiet));
        assert_eq!(FfmpegLogLevel::parse("WARN"), Some(FfmpegLogLevel::Warning));
        assert_eq!(
            FfmpegLogLevel::parse("warning"),
            Some(FfmpegLogLevel::Warning)
        );
        assert_eq!(FfmpegLogLevel::parse("Trace"), Some(FfmpegLogLevel::Trace));
        assert_eq!(FfmpegLogLevel::parse("loud"), None);
    }

    #[test]
    fn every_level_maps_to_a_distinct_ffmpeg_level() {
        for (level, ffmpeg_level, name) in super::LEVELS {
            assert_eq!(level.to_ffmpeg_level(), ffmpeg_level);
            assert_eq!(FfmpegLogLevel::from_ffmpeg_level(ffmpeg_level), Some(level));
            assert_eq!(FfmpegLogLevel::parse(name), Some(level));
            assert_eq!(level.name(), name);
        }
    }
}
