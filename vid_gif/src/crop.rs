//! Automatic crop detection
//!
//! A first ffmpeg pass runs the `cropdetect` filter into the null muxer and
//! the last reported `crop=W:H:X:Y` is fed to the encode pass.

use crate::command::input_args;
use crate::options::GifOptions;
use regex::Regex;
use shared_utils::{ToolCommand, FFMPEG};
use std::fmt;
use std::sync::OnceLock;

/// Marker ffmpeg puts in front of every cropdetect log line.
pub const CROPDETECT_MARKER: &str = "Parsed_cropdetect";

fn crop_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"crop=(\d+):(\d+):(\d+):(\d+)").expect("valid crop regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    /// First `crop=W:H:X:Y` in `line`. Empty regions are rejected.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = crop_regex().captures(line)?;
        let rect = CropRect {
            width: caps[1].parse().ok()?,
            height: caps[2].parse().ok()?,
            x: caps[3].parse().ok()?,
            y: caps[4].parse().ok()?,
        };
        (rect.width > 0 && rect.height > 0).then_some(rect)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Follows cropdetect output; the most recent report wins.
#[derive(Debug, Clone, Default)]
pub struct CropDetector {
    current: Option<CropRect>,
    reports: usize,
}

impl CropDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cropdetect line without a usable value clears the previous result.
    pub fn observe(&mut self, line: &str) {
        if line.contains(CROPDETECT_MARKER) {
            self.reports += 1;
            self.current = CropRect::parse(line);
        }
    }

    pub fn reports(&self) -> usize {
        self.reports
    }

    pub fn result(&self) -> Option<CropRect> {
        self.current
    }
}

/// `ffmpeg -analyzeduration … -probesize … [-ss] [-t] -i <input>
/// -filter_complex cropdetect=limit=<threshold> -f null -`
pub fn cropdetect_command(options: &GifOptions, threshold: u8) -> ToolCommand {
    input_args(ToolCommand::new(FFMPEG), options)
        .arg("-filter_complex")
        .arg(format!("cropdetect=limit={}", threshold))
        .args(["-f", "null", "-"])
}
