//! Subtitle stream selection
//!
//! Text subtitles are rendered with the `subtitles` filter (libass), bitmap
//! ones are overlaid straight from the input's subtitle stream.

use shared_utils::{duration_to_seconds, ProbeOutput, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const KNOWN_TEXT_FORMATS: &[&str] = &[
    "ass",
    "dvb_teletext",
    "eia_608",
    "hdmv_text_subtitle",
    "jacosub",
    "microdvd",
    "mov_text",
    "mpl2",
    "pjs",
    "realtext",
    "sami",
    "srt",
    "ssa",
    "stl",
    "subrip",
    "subviewer",
    "subviewer1",
    "text",
    "ttml",
    "vplayer",
    "webvtt",
];

pub const KNOWN_BITMAP_FORMATS: &[&str] = &[
    "dvb_subtitle",
    "dvd_subtitle",
    "hdmv_pgs_subtitle",
    "xsub",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleKind {
    Text,
    Bitmap,
}

impl SubtitleKind {
    pub fn from_codec(codec: &str) -> Option<Self> {
        if KNOWN_TEXT_FORMATS.contains(&codec) {
            Some(SubtitleKind::Text)
        } else if KNOWN_BITMAP_FORMATS.contains(&codec) {
            Some(SubtitleKind::Bitmap)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Position among the input's subtitle streams (`0:s:<index>`, `si=<index>`).
    pub index: usize,
    /// Absolute stream index in the container.
    pub stream_index: u32,
    pub codec: String,
    pub kind: SubtitleKind,
    pub language: Option<String>,
}

/// A selected track plus what the filter graph needs to burn it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOverlay {
    pub track: SubtitleTrack,
    /// File the `subtitles` filter reads from (the input video).
    pub source: PathBuf,
    /// Input seek in seconds. Text subtitles carry absolute timestamps while
    /// seeked frames restart at zero, so frames are shifted by this much.
    pub offset: Option<String>,
}

impl SubtitleOverlay {
    pub fn new(track: SubtitleTrack, source: PathBuf, seek: Option<&str>) -> Result<Self> {
        let offset = seek.map(duration_to_seconds).transpose()?;
        Ok(Self {
            track,
            source,
            offset,
        })
    }
}

/// Pick the `index`-th subtitle stream, warning (and returning `None`) when
/// it cannot be used.
pub fn select_subtitle_track(probe: &ProbeOutput, index: usize) -> Option<SubtitleTrack> {
    let subtitles: Vec<_> = probe.subtitle_streams().collect();

    if subtitles.is_empty() {
        warn!("Could not find subtitles in the file, they will be omitted");
        return None;
    }

    let Some(stream) = subtitles.get(index) else {
        warn!(
            requested = index,
            available = subtitles.len(),
            "Subtitle stream index out of range, subtitles will be omitted"
        );
        return None;
    };

    let codec = stream.codec_name.clone().unwrap_or_default();
    let Some(kind) = SubtitleKind::from_codec(&codec) else {
        warn!(
            codec = %codec,
            stream = stream.index,
            "Unsupported subtitle format, subtitles will be omitted"
        );
        return None;
    };

    debug!(
        codec = %codec,
        stream = stream.index,
        kind = ?kind,
        "Selected subtitle stream"
    );

    Some(SubtitleTrack {
        index,
        stream_index: stream.index,
        codec,
        kind,
        language: stream.language().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::parse_probe_output;

    fn probe() -> ProbeOutput {
        parse_probe_output(
            r#"{"streams": [
                {"index": 0, "codec_type": "video", "codec_name": "h264"},
                {"index": 1, "codec_type": "audio", "codec_name": "aac"},
                {"index": 2, "codec_type": "subtitle", "codec_name": "subrip", "tags": {"language": "eng"}},
                {"index": 3, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle"},
                {"index": 4, "codec_type": "subtitle", "codec_name": "arib_caption"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_classify_codecs() {
        assert_eq!(SubtitleKind::from_codec("webvtt"), Some(SubtitleKind::Text));
        assert_eq!(SubtitleKind::from_codec("dvd_subtitle"), Some(SubtitleKind::Bitmap));
        assert_eq!(SubtitleKind::from_codec("h264"), None);
    }

    #[test]
    fn test_select_by_relative_index() {
        let probe = probe();

        let first = select_subtitle_track(&probe, 0).unwrap();
        assert_eq!(first.stream_index, 2);
        assert_eq!(first.kind, SubtitleKind::Text);
        assert_eq!(first.language.as_deref(), Some("eng"));

        let second = select_subtitle_track(&probe, 1).unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.stream_index, 3);
        assert_eq!(second.kind, SubtitleKind::Bitmap);
    }

    #[test]
    fn test_unusable_selections() {
        let probe = probe();
        assert_eq!(select_subtitle_track(&probe, 2), None);
        assert_eq!(select_subtitle_track(&probe, 7), None);

        let no_subs = parse_probe_output(r#"{"streams": [{"index": 0, "codec_type": "video"}]}"#)
            .unwrap();
        assert_eq!(select_subtitle_track(&no_subs, 0), None);
    }

    #[test]
    fn test_overlay_offset_in_seconds() {
        let track = select_subtitle_track(&probe(), 0).unwrap();
        let overlay = SubtitleOverlay::new(track.clone(), "in.mkv".into(), Some("00:01:05.5")).unwrap();
        assert_eq!(overlay.offset.as_deref(), Some("65.5"));

        let overlay = SubtitleOverlay::new(track, "in.mkv".into(), None).unwrap();
        assert_eq!(overlay.offset, None);
    }
}
