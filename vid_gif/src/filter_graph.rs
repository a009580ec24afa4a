//! Filter graph compiler
//!
//! Turns [`GifOptions`] into the single `-filter_complex` argument of the
//! encode pass. Stages always appear in the same order:
//!
//! 1. bitmap subtitle overlay
//! 2. frame rate
//! 3. crop (detected or manual)
//! 4. scale, or the HDR → SDR tonemap chain
//! 5. `eq` adjustments
//! 6. text subtitles
//! 7. drawtext
//! 8. palette generation and use
//!
//! The output depends on nothing but the arguments.

use crate::crop::CropRect;
use crate::options::{GifOptions, TextOverlay, Tonemap};
use crate::subtitles::{SubtitleKind, SubtitleOverlay};
use crate::text::{
    count_lines, escape_drawtext, escape_filter_path, quote_graph_value, quote_option_value,
};

pub const DEFAULT_TEXT_COLOR: &str = "white";
pub const DEFAULT_TEXT_SIZE: u32 = 32;
pub const DEFAULT_TEXT_BORDER: u32 = 3;
pub const DEFAULT_TEXT_FONT: &str = "Arial";
pub const DEFAULT_TEXT_VARIANT: &str = "Bold";
pub const DEFAULT_TEXT_X: &str = "(main_w/2-text_w/2)";

/// Ordered list of filter stages joined with `,`.
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    stages: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: impl Into<String>) -> &mut Self {
        self.stages.push(stage.into());
        self
    }

    pub fn build(&self) -> String {
        self.stages.join(",")
    }
}

/// Build the complete filter graph for the encode pass.
pub fn build_filter_graph(
    options: &GifOptions,
    detected_crop: Option<&CropRect>,
    subtitles: Option<&SubtitleOverlay>,
) -> String {
    let mut graph = FilterGraph::new();

    if let Some(overlay) = subtitles.filter(|s| s.track.kind == SubtitleKind::Bitmap) {
        graph.push(format!("[0:v][0:s:{}]overlay", overlay.track.index));
    }

    graph.push(format!("fps={}", options.fps()));

    match detected_crop {
        Some(rect) => graph.push(rect.to_string()),
        None => graph.push(manual_crop(options)),
    };

    match options.tonemap {
        Some(algorithm) => push_tonemap(&mut graph, algorithm, options.width),
        None => {
            if let Some(width) = options.width {
                graph.push(format!(
                    "scale=flags=lanczos:sws_dither=none:width={}:height=-1",
                    width
                ));
            }
        }
    }

    for (key, value) in options.eq.stages() {
        graph.push(format!("eq={}={}", key, value));
    }

    if let Some(overlay) = subtitles.filter(|s| s.track.kind == SubtitleKind::Text) {
        push_text_subtitles(&mut graph, overlay);
    }

    if let Some(text) = &options.text {
        graph.push(drawtext(text));
    }

    graph.push("split [o1] [o2]");
    match options.palette {
        Some(colors) => graph.push(format!("[o1] palettegen={}:stats_mode=diff [p]", colors)),
        None => graph.push("[o1] palettegen=stats_mode=diff [p]"),
    };
    graph.push("[o2] fifo [o3]");
    graph.push(format!(
        "[o3] [p] paletteuse=dither={}:diff_mode=rectangle",
        options.dither
    ));

    graph.build()
}

fn manual_crop(options: &GifOptions) -> String {
    let crop = &options.crop;
    format!(
        "crop=w={}:h={}:x={}:y={}",
        crop.width.as_deref().unwrap_or("in_w"),
        crop.height.as_deref().unwrap_or("in_h"),
        crop.x.as_deref().unwrap_or("0"),
        crop.y.as_deref().unwrap_or("0"),
    )
}

fn push_tonemap(graph: &mut FilterGraph, algorithm: Tonemap, width: Option<u32>) {
    if let Some(width) = width {
        graph.push(format!(
            "zscale=dither=none:filter=lanczos:width={}:height=-1",
            width
        ));
    }
    graph
        .push("zscale=transfer=linear:npl=100")
        .push("zscale=npl=100")
        .push("format=gbrpf32le")
        .push("zscale=primaries=bt709")
        .push(format!("tonemap=tonemap={}:desat=0", algorithm))
        .push("zscale=transfer=bt709:matrix=bt709:range=tv")
        .push("format=yuv420p");
}

/// Seeked frames restart at zero while the subtitle file keeps absolute
/// timestamps, so the frames are shifted around the `subtitles` filter.
fn push_text_subtitles(graph: &mut FilterGraph, overlay: &SubtitleOverlay) {
    let source = escape_filter_path(&overlay.source.to_string_lossy());
    match &overlay.offset {
        Some(offset) => {
            graph
                .push(format!("setpts=PTS+{}/TB", offset))
                .push(format!("subtitles={}:si={}", source, overlay.track.index))
                .push("setpts=PTS-STARTPTS");
        }
        None => {
            graph.push(format!("subtitles={}:si={}", source, overlay.track.index));
        }
    }
}

/// Font values that look like a file are passed as `fontfile`, anything else
/// is a fontconfig pattern with the variant as its style.
fn font_option(text: &TextOverlay) -> String {
    let font = text.font.as_deref().unwrap_or(DEFAULT_TEXT_FONT);
    if is_font_file(font) {
        format!("fontfile={}", quote_option_value(font))
    } else {
        let variant = text.variant.as_deref().unwrap_or(DEFAULT_TEXT_VARIANT);
        format!("font={}", quote_option_value(&format!("{}:style={}", font, variant)))
    }
}

fn is_font_file(font: &str) -> bool {
    let lower = font.to_ascii_lowercase();
    font.contains('/')
        || font.contains('\\')
        || [".ttf", ".otf", ".ttc", ".woff", ".woff2", ".pfb"]
            .iter()
            .any(|ext| lower.ends_with(ext))
}

fn drawtext(text: &TextOverlay) -> String {
    let y = text.y.clone().unwrap_or_else(|| {
        format!("(main_h-line_h*1.5*{})", count_lines(&text.text))
    });
    let options = [
        format!(
            "x={}",
            quote_option_value(text.x.as_deref().unwrap_or(DEFAULT_TEXT_X))
        ),
        format!("y={}", quote_option_value(&y)),
        format!(
            "fontsize='{}'",
            text.size.unwrap_or(DEFAULT_TEXT_SIZE)
        ),
        format!(
            "fontcolor={}",
            quote_option_value(text.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR))
        ),
        format!(
            "borderw='{}'",
            text.border.unwrap_or(DEFAULT_TEXT_BORDER)
        ),
        font_option(text),
        format!("text={}", quote_graph_value(&escape_drawtext(&text.text))),
    ];
    format!("drawtext={}", options.join(":"))
}
