//! FFprobe wrapper module
//!
//! Builds the `ffprobe` invocation and parses its JSON report with serde.
//! Running the command is left to the caller's process runner.

use crate::errors::{GifError, Result};
use crate::ffmpeg_process::ToolCommand;
use crate::tools::FFPROBE;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProbeStream {
    pub index: u32,
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ProbeStream {
    pub fn is_subtitle(&self) -> bool {
        self.codec_type.as_deref() == Some("subtitle")
    }

    pub fn language(&self) -> Option<&str> {
        self.tags.get("language").map(String::as_str)
    }
}

/// Only the stream list is modelled; the `format` section is ignored.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

impl ProbeOutput {
    pub fn subtitle_streams(&self) -> impl Iterator<Item = &ProbeStream> {
        self.streams.iter().filter(|s| s.is_subtitle())
    }
}

/// `ffprobe -v error -print_format json -show_format -show_streams <input>`
pub fn ffprobe_command(input: &Path) -> ToolCommand {
    ToolCommand::new(FFPROBE)
        .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(input)
}

/// Parse the JSON document ffprobe printed.
pub fn parse_probe_output(json: &str) -> Result<ProbeOutput> {
    if json.trim().is_empty() {
        return Err(GifError::ProbeParse {
            tool: FFPROBE.to_string(),
            reason: "empty output".to_string(),
        });
    }
    serde_json::from_str(json).map_err(|e| GifError::ProbeParse {
        tool: FFPROBE.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "hevc", "width": 3840, "height": 2160, "color_transfer": "smpte2084"},
            {"index": 1, "codec_type": "audio", "codec_name": "eac3"},
            {"index": 2, "codec_type": "subtitle", "codec_name": "subrip", "tags": {"language": "eng"}},
            {"index": 3, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle", "tags": {"language": "fra"}}
        ],
        "format": {"format_name": "matroska,webm", "duration": "5400.123000"}
    }"#;

    #[test]
    fn test_parse_sample() {
        let probe = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(probe.streams.len(), 4);
        let subs: Vec<_> = probe.subtitle_streams().collect();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].codec_name.as_deref(), Some("subrip"));
        assert_eq!(subs[1].language(), Some("fra"));
        assert_eq!(subs[1].index, 3);
        assert_eq!(probe.streams[0].language(), None);
    }

    #[test]
    fn test_parse_missing_fields() {
        let probe = parse_probe_output(r#"{"streams":[{"index":0}]}"#).unwrap();
        assert_eq!(probe.subtitle_streams().count(), 0);
        assert!(probe.streams[0].codec_type.is_none());
        assert!(probe.streams[0].tags.is_empty());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            parse_probe_output("not json"),
            Err(GifError::ProbeParse { .. })
        ));
        assert!(matches!(
            parse_probe_output("  "),
            Err(GifError::ProbeParse { .. })
        ));
    }

    #[test]
    fn test_ffprobe_command_shape() {
        let cmd = ffprobe_command(Path::new("/videos/movie.mkv"));
        assert_eq!(
            cmd.to_string(),
            "ffprobe -v error -print_format json -show_format -show_streams /videos/movie.mkv"
        );
    }
}
