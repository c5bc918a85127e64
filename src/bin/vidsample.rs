use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vidsample::{
    FfmpegLogLevel, FrameSampler, ProgressCallback, ProgressInfo, ResizeSpec, SampleOptions,
    VideoSource, default_output_dir, set_ffmpeg_log_level,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidsample input.mp4 --fps 1\n      Extract 1 frame per second\n  vidsample input.mp4 --fps 2 --output ./my_frames\n      Extract 2 frames per second to ./my_frames\n  vidsample input.mp4 --fps 0.5 --resize 640x480\n      Extract 1 frame every 2 seconds, resized to 640x480\n  vidsample input.mp4 --info --json\n      Print metadata as JSON and exit";

/// Extensions the tool recognises as common video containers. Anything else
/// still gets attempted — FFmpeg decides what's decodable — but earns a
/// warning first.
const COMMON_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

#[derive(Debug, Parser)]
#[command(
    name = "vidsample",
    version,
    about = "Extract still frames from a video at a fixed sampling rate",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the input video file.
    #[arg(required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Frames to extract per second of source time (may be below 1).
    #[arg(long, default_value_t = 1.0)]
    fps: f64,

    /// Output directory for frames [default: ./frames_<video_stem>].
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Resize frames to WxH (e.g. 1280x720).
    #[arg(long, short = 'r')]
    resize: Option<ResizeSpec>,

    /// Write one file per unique source frame when oversampling past the
    /// native rate.
    #[arg(long)]
    dedupe: bool,

    /// Print source metadata and exit without extracting.
    #[arg(long)]
    info: bool,

    /// With --info, print machine-readable JSON.
    #[arg(long, requires = "info")]
    json: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose,
    /// debug, trace).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<FfmpegLogLevel>,

    /// Generate shell completion scripts and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

/// Renders pipeline progress as an indicatif bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::no_length();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn has_common_video_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| COMMON_VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

fn print_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = VideoSource::open(input)?;
    let metadata = source.metadata();

    if json {
        let payload = json!({
            "path": input.display().to_string(),
            "codec": metadata.codec,
            "width": metadata.width,
            "height": metadata.height,
            "fps": metadata.native_fps,
            "frame_count": metadata.total_frames,
            "duration_seconds": metadata.duration.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Video: {}x{} @ {:.2} fps [{}]",
            metadata.width, metadata.height, metadata.native_fps, metadata.codec,
        );
        println!("Duration: {:.2}s", metadata.duration.as_secs_f64());
        println!("Total frames: {}", metadata.total_frames);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "vidsample", &mut std::io::stdout());
        return Ok(());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    if let Some(level) = cli.log_level {
        set_ffmpeg_log_level(level);
    }

    let input = cli.input.ok_or("missing input video path")?;

    if cli.info {
        return print_info(&input, cli.json);
    }

    if !has_common_video_extension(&input) {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("file may not be a supported video format: {}", input.display()).yellow(),
        );
    }

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&input));

    let mut options = SampleOptions::new()
        .with_target_fps(cli.fps)
        .with_resize(cli.resize)
        .with_dedupe(cli.dedupe);
    // Fail on bad parameters before the banner probe opens the source.
    options.validate()?;

    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    // Probe once for the banner; the sampler re-opens for the actual run.
    {
        let source = VideoSource::open(&input)?;
        let metadata = source.metadata();
        println!(
            "Video: {}",
            input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string()),
        );
        println!(
            "  Duration: {:.2}s | FPS: {:.2} | Total frames: {}",
            metadata.duration.as_secs_f64(),
            metadata.native_fps,
            metadata.total_frames,
        );
        println!("  Sampling at: {} fps", cli.fps);
        if let Some(resize) = &cli.resize {
            println!("  Resize to: {resize}");
        }
    }

    let report = FrameSampler::new(&input, &output_dir, options).run()?;

    if let Some(progress) = progress {
        progress.finish();
    }

    if report.written == 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "no frames were extracted".yellow(),
        );
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "{} frame(s) written to {} ({} sampled, {} skipped)",
            report.written,
            output_dir.display(),
            report.attempted,
            report.skipped,
        )
        .green(),
    );

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recognises_common_video_extensions() {
        assert!(has_common_video_extension(Path::new("clip.mp4")));
        assert!(has_common_video_extension(Path::new("CLIP.MKV")));
        assert!(has_common_video_extension(Path::new("dir/clip.webm")));
        assert!(!has_common_video_extension(Path::new("clip.gif")));
        assert!(!has_common_video_extension(Path::new("clip")));
    }

    #[test]
    fn resize_flag_parses_through_clap() {
        let cli = Cli::parse_from(["vidsample", "in.mp4", "--resize", "1280x720"]);
        assert_eq!(
            cli.resize,
            Some(ResizeSpec {
                width: 1280,
                height: 720,
            }),
        );
    }

    #[test]
    fn rejects_zero_dimension_resize() {
        let result = Cli::try_parse_from(["vidsample", "in.mp4", "--resize", "0x480"]);
        assert!(result.is_err());
    }

    #[test]
    fn fps_defaults_to_one() {
        let cli = Cli::parse_from(["vidsample", "in.mp4"]);
        assert_eq!(cli.fps, 1.0);
    }
}
