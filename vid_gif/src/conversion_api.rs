//! Video → GIF Conversion API
//!
//! Runs the external passes strictly one after another:
//! - ffprobe, only when subtitles were requested
//! - cropdetect, only with autocrop
//! - the encode pass with the compiled filter graph
//!
//! Process spawning sits behind [`ProcessRunner`] so the pipeline can be
//! driven by a scripted runner in tests.

use crate::command::gif_command;
use crate::crop::{cropdetect_command, CropDetector, CropRect};
use crate::filter_graph::build_filter_graph;
use crate::options::GifOptions;
use crate::subtitles::{select_subtitle_track, SubtitleOverlay, SubtitleTrack};

use console::Term;
use shared_utils::progress::EncodeProgress;
use shared_utils::{
    ffprobe_command, parse_probe_output, require_tool, GifError, OutputLine, OutputStream,
    ProcessRunner, Result, SystemRunner, FFMPEG, FFPROBE,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    pub input: PathBuf,
    pub output: PathBuf,
    pub output_size: u64,
    pub elapsed: Duration,
    /// Region found by the cropdetect pass, if it ran and found one.
    pub crop: Option<CropRect>,
    /// Subtitle stream that was burned in.
    pub subtitles: Option<SubtitleTrack>,
}

/// Convert with real child processes, after checking the required tools
/// are installed.
pub fn convert(options: &GifOptions) -> Result<ConversionOutput> {
    require_tool(FFMPEG)?;
    if options.subtitle_index.is_some() {
        require_tool(FFPROBE)?;
    }
    convert_with(options, &SystemRunner)
}

pub fn convert_with(options: &GifOptions, runner: &dyn ProcessRunner) -> Result<ConversionOutput> {
    let start = Instant::now();

    if !options.input.is_file() {
        return Err(GifError::InputNotFound {
            path: options.input.clone(),
        });
    }

    info!(
        "🎬 {} → {}",
        options.input.display(),
        options.output.display()
    );

    let subtitles = match options.subtitle_index {
        Some(index) => probe_subtitles(options, runner, index)?,
        None => None,
    };

    let crop = match options.autocrop {
        Some(threshold) => detect_crop(options, runner, threshold)?,
        None => None,
    };

    let graph = build_filter_graph(options, crop.as_ref(), subtitles.as_ref());
    debug!(filter_graph = %graph, "Compiled filter graph");

    encode(options, runner, &graph)?;

    let output_size = std::fs::metadata(&options.output)?.len();
    let elapsed = start.elapsed();
    info!(
        "   ✅ Complete: {} ({} bytes) in {:.1}s",
        options.output.display(),
        output_size,
        elapsed.as_secs_f64()
    );

    Ok(ConversionOutput {
        input: options.input.clone(),
        output: options.output.clone(),
        output_size,
        elapsed,
        crop,
        subtitles: subtitles.map(|s| s.track),
    })
}

fn log_child_line(tool: &str, line: &OutputLine) {
    debug!(tool, stream = ?line.stream, "{}", line.text);
}

fn probe_subtitles(
    options: &GifOptions,
    runner: &dyn ProcessRunner,
    index: usize,
) -> Result<Option<SubtitleOverlay>> {
    let command = ffprobe_command(&options.input);
    let mut json = String::new();
    runner.run(&command, &mut |line: &OutputLine| match line.stream {
        OutputStream::Stdout => {
            json.push_str(&line.text);
            json.push('\n');
        }
        OutputStream::Stderr => log_child_line(FFPROBE, line),
    })?;

    let probe = parse_probe_output(&json)?;
    let Some(track) = select_subtitle_track(&probe, index) else {
        return Ok(None);
    };
    info!(
        "   💬 Subtitles: stream #{} ({}{})",
        track.stream_index,
        track.codec,
        track
            .language
            .as_deref()
            .map(|l| format!(", {}", l))
            .unwrap_or_default()
    );
    SubtitleOverlay::new(track, options.input.clone(), options.seek.as_deref()).map(Some)
}

fn detect_crop(
    options: &GifOptions,
    runner: &dyn ProcessRunner,
    threshold: u8,
) -> Result<Option<CropRect>> {
    let command = cropdetect_command(options, threshold);
    let mut detector = CropDetector::new();
    runner.run(&command, &mut |line: &OutputLine| {
        log_child_line(FFMPEG, line);
        detector.observe(&line.text);
    })?;

    match detector.result() {
        Some(rect) => {
            info!("   ✂️  Autocrop: {}", rect);
            Ok(Some(rect))
        }
        None => {
            warn!(
                reports = detector.reports(),
                "Could not detect a crop region, using manual crop settings"
            );
            Ok(None)
        }
    }
}

fn encode(options: &GifOptions, runner: &dyn ProcessRunner, graph: &str) -> Result<()> {
    let command = gif_command(options, graph);

    let visible = !options.verbosity.is_quiet()
        && !options.verbosity.is_verbose()
        && Term::stderr().is_term();
    let mut progress = EncodeProgress::new("GIF", options.clip_duration(), visible);

    let result = runner.run(&command, &mut |line: &OutputLine| {
        log_child_line(FFMPEG, line);
        progress.observe(&line.text);
    });

    match result {
        Ok(()) => {
            progress.finish();
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}
