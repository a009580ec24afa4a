//! Encode progress bar
//!
//! Driven by ffmpeg's own log lines (see [`FfmpegProgressParser`]), so no
//! extra `-progress` pipe is needed. Position is tracked in per-mille.

use crate::ffmpeg_process::FfmpegProgressParser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub mod progress_style {
    /// filled, current, empty
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    pub const ENCODE_TEMPLATE: &str =
        "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {percent:>3}% • ⏱️ {elapsed_precise} (ETA: {eta}) • {msg}";
}

const SCALE: u64 = 1000;

pub struct EncodeProgress {
    bar: ProgressBar,
    parser: FfmpegProgressParser,
}

impl EncodeProgress {
    /// `visible == false` gives a hidden bar that still tracks state.
    pub fn new(prefix: &str, total_duration: Option<f64>, visible: bool) -> Self {
        let bar = ProgressBar::new(SCALE);

        if visible {
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(progress_style::ENCODE_TEMPLATE)
                    .expect("Invalid progress bar template")
                    .progress_chars(progress_style::PROGRESS_CHARS)
                    .tick_chars(progress_style::SPINNER_CHARS),
            );
            bar.set_prefix(prefix.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        let parser = match total_duration {
            Some(total) if total > 0.0 => FfmpegProgressParser::with_duration(total),
            _ => FfmpegProgressParser::new(),
        };

        Self { bar, parser }
    }

    /// Feed one line of ffmpeg output.
    pub fn observe(&mut self, line: &str) {
        if let Some(fraction) = self.parser.parse_line(line) {
            self.bar.set_position((fraction * SCALE as f64).round() as u64);
            self.bar
                .set_message(format!("{:.1}s", self.parser.current_time()));
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.set_position(SCALE);
        self.bar.finish_and_clear();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 60.0 {
        let whole = duration.as_secs();
        format!("{}m {:02}s", whole / 60, whole % 60)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let mut progress = EncodeProgress::new("GIF", Some(10.0), false);
        progress.observe("frame=  25 fps=0.0 q=-0.0 size=N/A time=00:00:02.50 bitrate=N/A");
        assert_eq!(progress.position(), 250);
        progress.finish();
        assert_eq!(progress.position(), SCALE);
    }

    #[test]
    fn test_position_waits_for_duration() {
        let mut progress = EncodeProgress::new("GIF", None, false);
        progress.observe("time=00:00:05.00");
        assert_eq!(progress.position(), 0);
        progress.observe("  Duration: 00:00:20.00, start: 0.000000, bitrate: 800 kb/s");
        progress.observe("time=00:00:05.00");
        assert_eq!(progress.position(), 250);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
    }
}
