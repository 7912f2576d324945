use std::{fs, path::PathBuf};

use clap::{Parser, error::ErrorKind};
use colored::Colorize;
use env_logger::Env;
use framepeek::{
    DEFAULT_FRAME_LIMIT, FfmpegLogLevel, FrameSink, FrameView, FramepeekError, MediaFile,
    MediaMetadata, PipelineOptions, PpmSink, ScalingAlgorithm, SinkControl,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framepeek input.mp4\n  framepeek input.mp4 --frames 10 --out-dir frames --progress\n  framepeek input.mp4 --display --overlay logo.png\n  framepeek input.mp4 --info --json";

#[derive(Debug, Parser)]
#[command(
    name = "framepeek",
    version,
    about = "Decode the first video stream of a media file and save frames as PPM or show them in a window",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input media path.
    input: PathBuf,

    /// Present every frame in a window instead of saving PPM files.
    #[arg(long)]
    display: bool,

    /// Number of leading frames to save as PPM.
    #[arg(long, default_value_t = DEFAULT_FRAME_LIMIT)]
    frames: u64,

    /// Directory the PPM files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Image composited into the bottom-right quadrant in display mode.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Window width in display mode.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Window height in display mode.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Scaling algorithm used during conversion (bilinear, fast-bilinear, bicubic, point).
    #[arg(long)]
    scaling: Option<String>,

    /// Print metadata and exit without decoding.
    #[arg(long)]
    info: bool,

    /// Print metadata as machine-readable JSON (with --info).
    #[arg(long, requires = "info")]
    json: bool,

    /// Print FFmpeg's description of the container before decoding.
    #[arg(long)]
    dump: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar while decoding.
    #[arg(long)]
    progress: bool,
}

/// Wraps a sink and advances a progress bar for every frame it consumes.
struct ProgressSink<'s> {
    inner: &'s mut dyn FrameSink,
    bar: ProgressBar,
}

impl FrameSink for ProgressSink<'_> {
    fn consume(
        &mut self,
        index: u64,
        frame: &FrameView<'_>,
    ) -> Result<SinkControl, FramepeekError> {
        let control = self.inner.consume(index, frame)?;
        self.bar.inc(1);
        Ok(control)
    }

    fn wants_frames(&self) -> bool {
        self.inner.wants_frames()
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    FfmpegLogLevel::parse(value)
}

fn parse_scaling(value: &str) -> Option<ScalingAlgorithm> {
    ScalingAlgorithm::parse(value)
}

fn progress_bar(length: u64) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(length);
    let style =
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

fn print_metadata(metadata: &MediaMetadata, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        let payload = json!({
            "format": metadata.format,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "streams": metadata.stream_count,
            "video": metadata.video.as_ref().map(|video| json!({
                "stream_index": video.stream_index,
                "width": video.width,
                "height": video.height,
                "fps": video.frames_per_second,
                "frame_count": video.frame_count,
                "codec": video.codec,
                "pixel_format": video.pixel_format_name,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Format: {}", metadata.format);
        println!("Duration: {:?}", metadata.duration);
        println!("Streams: {}", metadata.stream_count);
        match &metadata.video {
            Some(video) => println!(
                "Video: stream {} {}x{} @ {:.2} fps [{}] ~{} frames",
                video.stream_index,
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
                video.frame_count,
            ),
            None => println!("Video: none"),
        }
    }
    Ok(())
}

fn pipeline_options(cli: &Cli) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
    let mut options = PipelineOptions::new();
    if let Some(scaling) = &cli.scaling {
        let parsed =
            parse_scaling(scaling).ok_or(format!("unsupported --scaling: {scaling}"))?;
        options = options.with_scaling(parsed);
    }
    Ok(options)
}

fn save_frames(
    cli: &Cli,
    media: &mut MediaFile,
    options: &PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let expected = media
        .metadata()
        .video
        .as_ref()
        .map(|video| video.frame_count)
        .filter(|count| *count > 0)
        .map_or(cli.frames, |count| count.min(cli.frames));

    let mut pipeline = media.pipeline(options)?;
    fs::create_dir_all(&cli.out_dir)?;

    let mut sink = PpmSink::new(&cli.out_dir, cli.frames);
    let summary = if cli.progress {
        let bar = progress_bar(expected)?;
        let mut progress = ProgressSink {
            inner: &mut sink,
            bar: bar.clone(),
        };
        let summary = pipeline.run(&mut progress)?;
        bar.finish_with_message(format!("saved {} frame(s)", summary.frames_delivered));
        summary
    } else {
        pipeline.run(&mut sink)?
    };

    if cli.verbose {
        for path in sink.written() {
            eprintln!("{} {}", "wrote".green().bold(), path.display());
        }
    }
    eprintln!(
        "{} {} frame(s) decoded, {} saved to {}",
        "done".green().bold(),
        summary.frames_decoded,
        sink.written().len(),
        cli.out_dir.display(),
    );
    Ok(())
}

#[cfg(feature = "display")]
fn show_frames(
    cli: &Cli,
    media: &mut MediaFile,
    options: &PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let title = format!("framepeek - {}", cli.input.display());
    let mut display = framepeek::DisplayOptions::new()
        .with_window_size(cli.width, cli.height)
        .with_title(title);
    if let Some(overlay) = &cli.overlay {
        display = display.with_overlay(overlay);
    }

    let summary = framepeek::run_display(media, options, &display)?;
    eprintln!(
        "{} {} frame(s) presented{}",
        "done".green().bold(),
        summary.frames_presented,
        if summary.closed_by_user {
            " (window closed)"
        } else {
            ""
        },
    );
    Ok(())
}

#[cfg(not(feature = "display"))]
fn show_frames(
    _cli: &Cli,
    _media: &mut MediaFile,
    _options: &PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("--display requires building with the `display` feature".into())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &cli.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        framepeek::set_ffmpeg_log_level(parsed);
    }

    if cli.overlay.is_some() && !cli.display {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "--overlay only applies with --display".yellow()
        );
    }

    let options = pipeline_options(cli)?;
    let mut media = MediaFile::open(&cli.input)?;

    if cli.dump {
        media.dump_format();
    }

    if cli.info {
        return print_metadata(media.metadata(), cli.json);
    }

    if cli.display {
        show_frames(cli, &mut media, &options)
    } else {
        save_frames(cli, &mut media, &options)
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
            _ => {
                // Prints the usage line along with the reason.
                let _ = error.print();
                std::process::exit(-1);
            }
        },
    };

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(error) = run(&cli) {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(-1);
    }
}
