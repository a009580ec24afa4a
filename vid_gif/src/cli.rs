//! Command line definition
//!
//! `-h` selects the crop height and `-V` the text variant, so help and
//! version are long-only.

use crate::options::{
    resolve_output_path, CropRegion, DitherMode, Equalizer, GifOptions, TextOverlay, Tonemap,
};
use clap::{ArgAction, Parser};
use shared_utils::{Result, Verbosity};
use std::path::PathBuf;
use tracing::warn;

const GENERAL: &str = "General GIF options";
const TEXT: &str = "Text overlay options (only used if text is defined)";
const OTHER: &str = "Other options";

#[derive(Parser, Debug)]
#[command(name = "vid-gif")]
#[command(
    version,
    about = "Convert a video into an animated GIF with ffmpeg",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Video to convert
    #[arg(value_name = "VIDEO")]
    pub input: PathBuf,

    /// Output GIF filename (".gif" is appended when missing)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Set time to seek to in the input video (use a count of seconds or HH:MM:SS.SS format)
    #[arg(short, long, value_name = "SEEK", help_heading = GENERAL)]
    pub seek: Option<String>,

    /// Set duration to use from the input video (use a count of seconds)
    #[arg(short, long, value_name = "TIME", help_heading = GENERAL)]
    pub time: Option<String>,

    /// Set frames per second for the resulting GIF (default 10)
    #[arg(short, long, value_name = "FRAMES", help_heading = GENERAL)]
    pub fps: Option<f64>,

    /// Scale the width of the resulting GIF in pixels (aspect ratio is preserved)
    #[arg(short, long, value_name = "WIDTH", help_heading = GENERAL)]
    pub width: Option<u32>,

    /// Set the palette size of the resulting GIF (4 to 255 colors)
    #[arg(short, long, value_name = "PALETTE", help_heading = GENERAL)]
    pub palette: Option<u16>,

    /// Set the dithering algorithm for the palette (default "floyd_steinberg")
    #[arg(
        short,
        long,
        value_enum,
        value_name = "ALGORITHM",
        num_args = 0..=1,
        default_missing_value = "floyd_steinberg",
        help_heading = GENERAL
    )]
    pub dither: Option<DitherMode>,

    /// Disable dithering
    #[arg(long, conflicts_with = "dither", help_heading = GENERAL)]
    pub no_dither: bool,

    /// Pixel size of width to select from source video, before scaling
    #[arg(short = 'c', long, value_name = "SIZE", help_heading = GENERAL)]
    pub crop_size_w: Option<String>,

    /// Pixel size of height to select from source video, before scaling
    #[arg(short = 'h', long, value_name = "SIZE", help_heading = GENERAL)]
    pub crop_size_h: Option<String>,

    /// Pixel offset from left to select from source video, before scaling
    #[arg(short = 'x', long, value_name = "OFFSET", help_heading = GENERAL)]
    pub crop_offset_x: Option<String>,

    /// Pixel offset from top to select from source video, before scaling
    #[arg(short = 'y', long, value_name = "OFFSET", help_heading = GENERAL)]
    pub crop_offset_y: Option<String>,

    /// Attempt automatic cropping based on black region, scaled from 0 (nothing)
    /// to 255 (everything), default threshold 24
    #[arg(
        short,
        long,
        value_name = "THRESHOLD",
        num_args = 0..=1,
        default_missing_value = "24",
        help_heading = GENERAL
    )]
    pub autocrop: Option<u8>,

    /// Apply contrast adjustment, scaled from -2.0 to 2.0 (default 1)
    #[arg(long, value_name = "CONTRAST", allow_negative_numbers = true, help_heading = GENERAL)]
    pub contrast: Option<f64>,

    /// Apply brightness adjustment, scaled from -1.0 to 1.0 (default 0)
    #[arg(long, value_name = "BRIGHTNESS", allow_negative_numbers = true, help_heading = GENERAL)]
    pub brightness: Option<f64>,

    /// Apply saturation adjustment, scaled from 0.0 to 3.0 (default 1)
    #[arg(long, value_name = "SATURATION", help_heading = GENERAL)]
    pub saturation: Option<f64>,

    /// Apply gamma adjustment, scaled from 0.1 to 10.0 (default 1)
    #[arg(long, value_name = "GAMMA", help_heading = GENERAL)]
    pub gamma: Option<f64>,

    /// Apply red channel gamma adjustment, scaled from 0.1 to 10.0 (default 1)
    #[arg(long, value_name = "GAMMA", help_heading = GENERAL)]
    pub red_gamma: Option<f64>,

    /// Apply green channel gamma adjustment, scaled from 0.1 to 10.0 (default 1)
    #[arg(long, value_name = "GAMMA", help_heading = GENERAL)]
    pub green_gamma: Option<f64>,

    /// Apply blue channel gamma adjustment, scaled from 0.1 to 10.0 (default 1)
    #[arg(long, value_name = "GAMMA", help_heading = GENERAL)]
    pub blue_gamma: Option<f64>,

    /// Tonemap HDR (BT.2020) to SDR (BT.709), requires ffmpeg with libzimg
    /// (default "hable", "mobius" is a good alternative)
    #[arg(
        long,
        value_enum,
        value_name = "ALGORITHM",
        num_args = 0..=1,
        default_missing_value = "hable",
        help_heading = GENERAL
    )]
    pub tonemap: Option<Tonemap>,

    /// Burn in subtitles from the video (requires ffprobe); takes the
    /// subtitle stream index, default 0
    #[arg(
        long,
        value_name = "INDEX",
        num_args = 0..=1,
        default_missing_value = "0",
        value_parser = parse_subtitle_index,
        help_heading = GENERAL
    )]
    pub subtitles: Option<usize>,

    /// Set text to overlay on the GIF (use "\n" for line breaks)
    #[arg(short = 'T', long, value_name = "TEXT", help_heading = TEXT)]
    pub text: Option<String>,

    /// Set the color for text overlay
    #[arg(short = 'C', long, value_name = "TEXTCOLOR", help_heading = TEXT)]
    pub text_color: Option<String>,

    /// Set the point size for text overlay
    #[arg(short = 'S', long, value_name = "TEXTSIZE", help_heading = TEXT)]
    pub text_size: Option<u32>,

    /// Set the width of the border for text overlay
    #[arg(short = 'B', long, value_name = "TEXTBORDER", help_heading = TEXT)]
    pub text_border: Option<u32>,

    /// Set the font name (or font file) for text overlay
    #[arg(short = 'F', long, value_name = "TEXTFONT", help_heading = TEXT)]
    pub text_font: Option<String>,

    /// Set the font variant for text overlay (e.g., "Semibold")
    #[arg(short = 'V', long, value_name = "TEXTVARIANT", help_heading = TEXT)]
    pub text_variant: Option<String>,

    /// Set the X position for the text, starting from left (default is center)
    #[arg(
        short = 'X',
        long,
        value_name = "TEXTXPOS",
        allow_negative_numbers = true,
        help_heading = TEXT
    )]
    pub text_x_position: Option<String>,

    /// Set the Y position for the text, starting from top (default is near bottom)
    #[arg(
        short = 'Y',
        long,
        value_name = "TEXTYPOS",
        allow_negative_numbers = true,
        help_heading = TEXT
    )]
    pub text_y_position: Option<String>,

    /// Show ffmpeg command executed and output
    #[arg(short, long, help_heading = OTHER)]
    pub verbose: bool,

    /// Suppress all log output (overrides verbose)
    #[arg(short, long, help_heading = OTHER)]
    pub quiet: bool,

    /// Show this message
    #[arg(long, action = ArgAction::Help, help_heading = OTHER)]
    pub help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version, help_heading = OTHER)]
    pub version: Option<bool>,
}

fn parse_subtitle_index(value: &str) -> std::result::Result<usize, String> {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value
            .parse()
            .map_err(|e: std::num::ParseIntError| e.to_string())
    } else {
        Err("Selecting subtitles by filename is not yet supported".to_string())
    }
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    fn has_text_styling(&self) -> bool {
        self.text_color.is_some()
            || self.text_size.is_some()
            || self.text_border.is_some()
            || self.text_font.is_some()
            || self.text_variant.is_some()
            || self.text_x_position.is_some()
            || self.text_y_position.is_some()
    }

    /// Typed, validated options with the output path resolved.
    pub fn into_options(self) -> Result<GifOptions> {
        if self.text.is_none() && self.has_text_styling() {
            warn!("Text overlay options are ignored without --text");
        }

        let verbosity = self.verbosity();
        let output = resolve_output_path(&self.input, self.output.as_deref());
        let dither = if self.no_dither {
            DitherMode::None
        } else {
            self.dither.unwrap_or_default()
        };

        let text = self.text.map(|text| TextOverlay {
            text,
            color: self.text_color,
            size: self.text_size,
            border: self.text_border,
            font: self.text_font,
            variant: self.text_variant,
            x: self.text_x_position,
            y: self.text_y_position,
        });

        let options = GifOptions {
            input: self.input,
            output,
            seek: self.seek,
            time: self.time,
            fps: self.fps,
            width: self.width,
            palette: self.palette,
            dither,
            crop: CropRegion {
                width: self.crop_size_w,
                height: self.crop_size_h,
                x: self.crop_offset_x,
                y: self.crop_offset_y,
            },
            autocrop: self.autocrop,
            eq: Equalizer {
                contrast: self.contrast,
                brightness: self.brightness,
                saturation: self.saturation,
                gamma: self.gamma,
                gamma_r: self.red_gamma,
                gamma_g: self.green_gamma,
                gamma_b: self.blue_gamma,
            },
            tonemap: self.tonemap,
            subtitle_index: self.subtitles,
            text,
            verbosity,
        };

        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use shared_utils::GifError;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["vid-gif"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn options(args: &[&str]) -> GifOptions {
        parse(args).into_options().unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_minimal_invocation() {
        let options = options(&["clips/movie.mkv"]);
        assert_eq!(options.input, PathBuf::from("clips/movie.mkv"));
        assert_eq!(options.output, PathBuf::from("clips/movie.gif"));
        assert_eq!(options.dither, DitherMode::FloydSteinberg);
        assert_eq!(options.verbosity, Verbosity::Normal);
        assert!(options.text.is_none());
    }

    #[test]
    fn test_output_positional() {
        let options = options(&["movie.mkv", "funny"]);
        assert_eq!(options.output, PathBuf::from("funny.gif"));
    }

    #[test]
    fn test_short_crop_flags_take_h() {
        let options = options(&["movie.mkv", "-c", "640", "-h", "360", "-x", "10", "-y", "20"]);
        assert_eq!(options.crop.width.as_deref(), Some("640"));
        assert_eq!(options.crop.height.as_deref(), Some("360"));
        assert_eq!(options.crop.x.as_deref(), Some("10"));
        assert_eq!(options.crop.y.as_deref(), Some("20"));
    }

    #[test]
    fn test_help_is_long_only() {
        let err = Cli::try_parse_from(["vid-gif", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["vid-gif", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_optional_value_flags() {
        let cli = parse(&["movie.mkv", "-d"]);
        assert_eq!(cli.dither, Some(DitherMode::FloydSteinberg));
        let cli = parse(&["movie.mkv", "-d", "sierra2_4a"]);
        assert_eq!(cli.dither, Some(DitherMode::Sierra24a));

        let cli = parse(&["movie.mkv", "-a"]);
        assert_eq!(cli.autocrop, Some(24));
        let cli = parse(&["movie.mkv", "--autocrop", "40"]);
        assert_eq!(cli.autocrop, Some(40));

        let cli = parse(&["movie.mkv", "--tonemap"]);
        assert_eq!(cli.tonemap, Some(Tonemap::Hable));
        let cli = parse(&["movie.mkv", "--tonemap", "mobius"]);
        assert_eq!(cli.tonemap, Some(Tonemap::Mobius));

        let cli = parse(&["movie.mkv", "--subtitles"]);
        assert_eq!(cli.subtitles, Some(0));
        let cli = parse(&["movie.mkv", "--subtitles", "2"]);
        assert_eq!(cli.subtitles, Some(2));
    }

    #[test]
    fn test_subtitle_filename_rejected() {
        let err = Cli::try_parse_from(["vid-gif", "movie.mkv", "--subtitles", "movie.srt"])
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Selecting subtitles by filename is not yet supported"));
    }

    #[test]
    fn test_no_dither() {
        let options = options(&["movie.mkv", "--no-dither"]);
        assert_eq!(options.dither, DitherMode::None);
        assert!(Cli::try_parse_from(["vid-gif", "movie.mkv", "--no-dither", "-d", "bayer"]).is_err());
    }

    #[test]
    fn test_negative_eq_values() {
        let options = options(&["movie.mkv", "--contrast", "-1.5", "--brightness", "-0.2"]);
        assert_eq!(options.eq.contrast, Some(-1.5));
        assert_eq!(options.eq.brightness, Some(-0.2));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = parse(&["movie.mkv", "--saturation", "4"])
            .into_options()
            .unwrap_err();
        assert!(matches!(err, GifError::InvalidOption { option: "--saturation", .. }));

        let err = parse(&["movie.mkv", "-p", "300"]).into_options().unwrap_err();
        assert!(matches!(err, GifError::InvalidOption { option: "--palette", .. }));

        assert!(Cli::try_parse_from(["vid-gif", "movie.mkv", "-a", "300"]).is_err());
    }

    #[test]
    fn test_text_overlay() {
        let options = options(&[
            "movie.mkv", "-T", "Hello\\nWorld", "-C", "yellow", "-S", "40", "-B", "2", "-F",
            "Helvetica", "-V", "Italic", "-X", "10", "-Y", "-20",
        ]);
        let text = options.text.unwrap();
        assert_eq!(text.text, "Hello\\nWorld");
        assert_eq!(text.color.as_deref(), Some("yellow"));
        assert_eq!(text.size, Some(40));
        assert_eq!(text.border, Some(2));
        assert_eq!(text.font.as_deref(), Some("Helvetica"));
        assert_eq!(text.variant.as_deref(), Some("Italic"));
        assert_eq!(text.x.as_deref(), Some("10"));
        assert_eq!(text.y.as_deref(), Some("-20"));
    }

    #[test]
    fn test_text_styling_without_text_is_ignored() {
        let options = options(&["movie.mkv", "-C", "red"]);
        assert!(options.text.is_none());
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(parse(&["movie.mkv", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["movie.mkv", "-v", "-q"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_seek_and_time() {
        let options = options(&["movie.mkv", "-s", "00:01:00", "-t", "3.5"]);
        assert_eq!(options.seek.as_deref(), Some("00:01:00"));
        assert_eq!(options.clip_duration(), Some(3.5));

        let err = parse(&["movie.mkv", "-t", "soon"]).into_options().unwrap_err();
        assert!(matches!(err, GifError::InvalidOption { option: "--time", .. }));
    }

    #[test]
    fn test_huge_seek_is_an_error_not_a_panic() {
        let err = parse(&["movie.mkv", "-s", "9999999999999999:00:00"])
            .into_options()
            .unwrap_err();
        assert!(matches!(err, GifError::InvalidOption { option: "--seek", .. }));
    }
}
