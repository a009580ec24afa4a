//! ffmpeg command lines for the encode pass

use crate::options::GifOptions;
use shared_utils::{ToolCommand, FFMPEG};

/// Largest value ffmpeg accepts for `-analyzeduration` / `-probesize`; lets
/// it find late-starting subtitle and HDR side-data streams.
pub const MAX_PROBE: &str = "2147483647";

/// `-analyzeduration … -probesize … [-ss S] [-t T] -i <input>`
pub(crate) fn input_args(command: ToolCommand, options: &GifOptions) -> ToolCommand {
    command
        .args(["-analyzeduration", MAX_PROBE, "-probesize", MAX_PROBE])
        .opt_pair("-ss", options.seek.as_deref())
        .opt_pair("-t", options.time.as_deref())
        .arg("-i")
        .arg(&options.input)
}

/// `ffmpeg -y -analyzeduration … -probesize … -loglevel level+verbose [-ss S]
/// [-t T] -i <input> -filter_complex <graph> -f gif <output>`
pub fn gif_command(options: &GifOptions, filter_graph: &str) -> ToolCommand {
    ToolCommand::new(FFMPEG)
        .arg("-y")
        .args(["-analyzeduration", MAX_PROBE, "-probesize", MAX_PROBE])
        .args(["-loglevel", "level+verbose"])
        .opt_pair("-ss", options.seek.as_deref())
        .opt_pair("-t", options.time.as_deref())
        .arg("-i")
        .arg(&options.input)
        .arg("-filter_complex")
        .arg(filter_graph)
        .args(["-f", "gif"])
        .arg(&options.output)
}
