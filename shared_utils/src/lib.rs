//! Shared Utilities for the vid-gif converter
//!
//! Plumbing that is not specific to GIF making:
//! - Unified error type
//! - Logging setup (stderr + rolling file)
//! - External tools detection
//! - ffmpeg time duration syntax
//! - FFprobe invocation and JSON model
//! - Child process runner with merged, line-streamed output

pub mod duration;
pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod logging;
pub mod progress;
pub mod tools;

pub use duration::{duration_to_seconds, is_valid_duration, parse_duration};
pub use errors::{GifError, Result};
pub use ffmpeg_process::{
    format_ffmpeg_error, get_error_suggestion, FfmpegProgressParser, OutputLine, OutputStream,
    ProcessRunner, SystemRunner, ToolCommand,
};
pub use ffprobe::{ffprobe_command, parse_probe_output, ProbeOutput, ProbeStream};
pub use logging::{init_logging, LogConfig, Verbosity};
pub use progress::{format_bytes, format_duration, EncodeProgress};
pub use tools::{require_tool, FFMPEG, FFPROBE};
