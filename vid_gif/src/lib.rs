//! vid-gif - Video to animated GIF through ffmpeg
//!
//! Compiles a flat set of options into one ffmpeg filter graph and runs the
//! external passes:
//! - optional ffprobe pass to pick a subtitle stream
//! - optional cropdetect pass to find black borders
//! - the encode pass (palettegen + paletteuse)
//!
//! ## Example
//! ```rust,ignore
//! use vid_gif::{convert, GifOptions};
//!
//! let mut options = GifOptions::new("movie.mkv");
//! options.seek = Some("00:01:30".to_string());
//! options.time = Some("4".to_string());
//! options.width = Some(480);
//! let result = convert(&options)?;
//! println!("{} ({} bytes)", result.output.display(), result.output_size);
//! ```

pub mod cli;
pub mod command;
pub mod conversion_api;
pub mod crop;
pub mod filter_graph;
pub mod options;
pub mod subtitles;
pub mod text;

pub use cli::Cli;
pub use command::gif_command;
pub use conversion_api::{convert, convert_with, ConversionOutput};
pub use crop::{cropdetect_command, CropDetector, CropRect};
pub use filter_graph::{build_filter_graph, FilterGraph};
pub use options::{
    resolve_output_path, CropRegion, DitherMode, Equalizer, GifOptions, TextOverlay, Tonemap,
};
pub use subtitles::{select_subtitle_track, SubtitleKind, SubtitleOverlay, SubtitleTrack};
pub use text::{count_lines, escape_drawtext, escape_filter_path};

pub use shared_utils::errors::{GifError, Result};
