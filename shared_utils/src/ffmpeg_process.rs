//! FFmpeg process management
//!
//! Child processes get their stdin closed and both stdout and stderr piped.
//! Each pipe is drained by its own thread so a chatty stderr can never fill
//! the OS pipe buffer and stall the child while we read the other stream.
//! Lines from both pipes are merged, in arrival order, into one stream.
//!
//! ## Example
//!
//! ```ignore
//! use shared_utils::ffmpeg_process::{ProcessRunner, SystemRunner, ToolCommand};
//!
//! let cmd = ToolCommand::new("ffmpeg").args(["-i", "in.mp4", "-f", "null", "-"]);
//! SystemRunner.run(&cmd, &mut |line| println!("{}", line.text))?;
//! ```

use crate::errors::{GifError, Result};
use crate::logging::log_external_tool;
use regex::Regex;
use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;
use std::time::Instant;
use tracing::{debug, error};

/// Lines kept around to explain a failure.
const ERROR_TAIL_LINES: usize = 64;

/// A program plus its argument vector, never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append `flag value` only when `value` is present.
    pub fn opt_pair(self, flag: &str, value: Option<impl AsRef<OsStr>>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Value following the first occurrence of `flag`, if any.
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of child output, without the line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }
}

/// Runs an external command to completion, handing every output line to `on_line`.
///
/// A non-zero exit status is reported as [`GifError::ProcessFailed`].
pub trait ProcessRunner {
    fn run(&self, command: &ToolCommand, on_line: &mut dyn FnMut(&OutputLine)) -> Result<()>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &ToolCommand, on_line: &mut dyn FnMut(&OutputLine)) -> Result<()> {
        let command_str = command.to_string();
        debug!(command = %command_str, "Executing external command");

        let start = Instant::now();
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GifError::tool_not_found(command.program()),
                _ => GifError::Io(e),
            })?;
        let pid = child.id();

        let (tx, rx) = mpsc::channel::<OutputLine>();
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            pumps.push(thread::spawn(move || pump_lines(stdout, OutputStream::Stdout, tx)));
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            pumps.push(thread::spawn(move || pump_lines(stderr, OutputStream::Stderr, tx)));
        }
        drop(tx);

        let mut tail: VecDeque<String> = VecDeque::with_capacity(ERROR_TAIL_LINES);
        for line in rx {
            if tail.len() == ERROR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.text.clone());
            on_line(&line);
        }
        for pump in pumps {
            // a panicked reader only loses output, the exit status still decides
            let _ = pump.join();
        }

        let status = child.wait()?;
        log_external_tool(command.program(), &command_str, status.code(), start.elapsed());

        if status.success() {
            return Ok(());
        }

        let tail: Vec<String> = tail.into_iter().collect();
        let detail = format_ffmpeg_error(&tail.join("\n"));
        error!(
            pid,
            exit_code = ?status.code(),
            detail = %detail,
            suggestion = ?get_error_suggestion(&tail.join("\n")),
            "External command failed"
        );
        Err(GifError::ProcessFailed {
            tool: command.program().to_string(),
            pid,
            exit_code: status.code(),
            detail,
        })
    }
}

/// Forward `reader` line by line. ffmpeg redraws its stats line with a bare
/// `\r`, so carriage returns end a line too.
fn pump_lines<R: Read>(mut reader: R, stream: OutputStream, tx: mpsc::Sender<OutputLine>) {
    let mut chunk = [0u8; 4096];
    let mut pending = Vec::new();
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        };
        for &byte in &chunk[..n] {
            if byte == b'\n' || byte == b'\r' {
                if !flush_line(&mut pending, stream, &tx) {
                    return;
                }
            } else {
                pending.push(byte);
            }
        }
    }
    flush_line(&mut pending, stream, &tx);
}

/// Returns false once the receiving side has gone away.
fn flush_line(pending: &mut Vec<u8>, stream: OutputStream, tx: &mpsc::Sender<OutputLine>) -> bool {
    let text = String::from_utf8_lossy(pending).trim_end().to_string();
    pending.clear();
    if text.is_empty() {
        return true;
    }
    tx.send(OutputLine { stream, text }).is_ok()
}

/// Pick the most meaningful error line out of ffmpeg output.
///
/// 1. the last line mentioning "Error"/"error"
/// 2. otherwise the last non-progress, non-empty line
/// 3. otherwise "Unknown FFmpeg error"
pub fn format_ffmpeg_error(output: &str) -> String {
    if let Some(error_line) = output
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    output
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

/// Hints for the failure modes people actually hit when making GIFs.
pub fn get_error_suggestion(output: &str) -> Option<String> {
    let patterns = [
        (
            "No such filter: 'zscale'",
            "--tonemap needs an ffmpeg built with libzimg",
        ),
        (
            "No such filter: 'subtitles'",
            "--subtitles needs an ffmpeg built with libass",
        ),
        (
            "No such filter: 'drawtext'",
            "--text needs an ffmpeg built with libfreetype",
        ),
        ("Cannot find a valid font", "pick an installed font with --text-font"),
        ("No such file or directory", "check the input path"),
        ("Invalid data found", "the input file may be corrupt"),
        ("Permission denied", "check read/write permissions on input and output"),
        (
            "Invalid too big or non positive size",
            "the crop region is larger than the video; check --crop-size-w/--crop-size-h",
        ),
    ];

    patterns
        .iter()
        .find(|(pattern, _)| output.contains(pattern))
        .map(|(_, suggestion)| suggestion.to_string())
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Duration:\s*(\d+:\d+:\d+(?:\.\d+)?)").expect("valid Duration regex")
    })
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\btime=\s*(\d+:\d+:\d+(?:\.\d+)?)").expect("valid time regex"))
}

/// Tracks encode progress from ffmpeg's log lines.
///
/// Understands `Duration: 00:01:23.45,` (input banner) and
/// `time=00:00:12.34` (stats line). The first `Duration:` seen only counts
/// when no total was supplied up front, e.g. from `-t`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProgressParser {
    total_duration: Option<f64>,
    current_time: f64,
}

impl FfmpegProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(total_duration: f64) -> Self {
        Self {
            total_duration: Some(total_duration),
            current_time: 0.0,
        }
    }

    /// Feed one line; returns progress in `0.0..=1.0` once it can be computed.
    pub fn parse_line(&mut self, line: &str) -> Option<f64> {
        if self.total_duration.is_none() {
            if let Some(caps) = duration_regex().captures(line) {
                self.total_duration = Self::parse_time(&caps[1]).filter(|d| *d > 0.0);
            }
        }

        if let Some(caps) = time_regex().captures(line) {
            if let Some(time) = Self::parse_time(&caps[1]) {
                self.current_time = time;
            }
        }

        self.progress()
    }

    /// `HH:MM:SS.ms` → seconds
    fn parse_time(time_str: &str) -> Option<f64> {
        let parts: Vec<&str> = time_str.split(':').collect();
        if parts.len() != 3 {
            return None;
        }

        let hours: f64 = parts[0].parse().ok()?;
        let minutes: f64 = parts[1].parse().ok()?;
        let seconds: f64 = parts[2].parse().ok()?;

        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    }

    pub fn progress(&self) -> Option<f64> {
        match self.total_duration {
            Some(total) if total > 0.0 && self.current_time > 0.0 => {
                Some((self.current_time / total).min(1.0))
            }
            _ => None,
        }
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_progress_parser_time_accuracy(
            hours in 0u32..24,
            minutes in 0u32..60,
            seconds in 0u32..60,
            total_duration in 1.0f64..86400.0
        ) {
            let mut parser = FfmpegProgressParser::with_duration(total_duration);
            let line = format!("time={:02}:{:02}:{:02}.00", hours, minutes, seconds);
            let progress = parser.parse_line(&line);

            let current_seconds = hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64;
            if current_seconds > 0.0 {
                let expected = (current_seconds / total_duration).min(1.0);
                prop_assert!(progress.is_some());
                let actual = progress.unwrap();
                prop_assert!((actual - expected).abs() < 0.01);
            }
        }

        #[test]
        fn prop_format_error_non_empty(content in "[a-zA-Z0-9 ]{1,100}") {
            prop_assert!(!format_ffmpeg_error(&content).is_empty());
        }
    }
}
