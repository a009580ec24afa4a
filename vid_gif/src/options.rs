//! Typed GIF options
//!
//! Everything the filter graph compiler and command builders need, already
//! parsed and range-checked. Produced by [`crate::cli::Cli::into_options`].

use clap::ValueEnum;
use shared_utils::{is_valid_duration, parse_duration, GifError, Result, Verbosity};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_FPS: f64 = 10.0;
pub const DEFAULT_AUTOCROP_THRESHOLD: u8 = 24;
pub const MIN_PALETTE: u16 = 4;
pub const MAX_PALETTE: u16 = 255;

/// `paletteuse` dithering algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DitherMode {
    Bayer,
    Heckbert,
    #[default]
    #[value(name = "floyd_steinberg")]
    FloydSteinberg,
    Sierra2,
    #[value(name = "sierra2_4a")]
    Sierra24a,
    Sierra3,
    Burkes,
    Atkinson,
    None,
}

impl DitherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DitherMode::Bayer => "bayer",
            DitherMode::Heckbert => "heckbert",
            DitherMode::FloydSteinberg => "floyd_steinberg",
            DitherMode::Sierra2 => "sierra2",
            DitherMode::Sierra24a => "sierra2_4a",
            DitherMode::Sierra3 => "sierra3",
            DitherMode::Burkes => "burkes",
            DitherMode::Atkinson => "atkinson",
            DitherMode::None => "none",
        }
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `tonemap` filter algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Tonemap {
    None,
    Linear,
    Gamma,
    Clip,
    Reinhard,
    #[default]
    Hable,
    Mobius,
}

impl Tonemap {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tonemap::None => "none",
            Tonemap::Linear => "linear",
            Tonemap::Gamma => "gamma",
            Tonemap::Clip => "clip",
            Tonemap::Reinhard => "reinhard",
            Tonemap::Hable => "hable",
            Tonemap::Mobius => "mobius",
        }
    }
}

impl fmt::Display for Tonemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manual crop region. Values are ffmpeg expressions, unset ones fall back
/// to the full frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropRegion {
    pub width: Option<String>,
    pub height: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

/// `eq` filter adjustments, each rendered as its own stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equalizer {
    pub contrast: Option<f64>,
    pub brightness: Option<f64>,
    pub saturation: Option<f64>,
    pub gamma: Option<f64>,
    pub gamma_r: Option<f64>,
    pub gamma_g: Option<f64>,
    pub gamma_b: Option<f64>,
}

impl Equalizer {
    /// Set adjustments as `(eq key, value)` in stage order.
    pub fn stages(&self) -> Vec<(&'static str, f64)> {
        [
            ("contrast", self.contrast),
            ("brightness", self.brightness),
            ("saturation", self.saturation),
            ("gamma", self.gamma),
            ("gamma_r", self.gamma_r),
            ("gamma_g", self.gamma_g),
            ("gamma_b", self.gamma_b),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }

    fn validate(&self) -> Result<()> {
        check_range("--contrast", self.contrast, -2.0, 2.0)?;
        check_range("--brightness", self.brightness, -1.0, 1.0)?;
        check_range("--saturation", self.saturation, 0.0, 3.0)?;
        check_range("--gamma", self.gamma, 0.1, 10.0)?;
        check_range("--red-gamma", self.gamma_r, 0.1, 10.0)?;
        check_range("--green-gamma", self.gamma_g, 0.1, 10.0)?;
        check_range("--blue-gamma", self.gamma_b, 0.1, 10.0)?;
        Ok(())
    }
}

/// Text drawn on top of every frame. Styling fields are `None` when the
/// default should be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub color: Option<String>,
    pub size: Option<u32>,
    pub border: Option<u32>,
    pub font: Option<String>,
    pub variant: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GifOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub seek: Option<String>,
    pub time: Option<String>,
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub palette: Option<u16>,
    pub dither: DitherMode,
    pub crop: CropRegion,
    pub autocrop: Option<u8>,
    pub eq: Equalizer,
    pub tonemap: Option<Tonemap>,
    /// Relative index among the input's subtitle streams.
    pub subtitle_index: Option<usize>,
    pub text: Option<TextOverlay>,
    pub verbosity: Verbosity,
}

impl GifOptions {
    /// Options for `input` with every setting at its default and the output
    /// next to the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = resolve_output_path(&input, None);
        Self {
            input,
            output,
            seek: None,
            time: None,
            fps: None,
            width: None,
            palette: None,
            dither: DitherMode::default(),
            crop: CropRegion::default(),
            autocrop: None,
            eq: Equalizer::default(),
            tonemap: None,
            subtitle_index: None,
            text: None,
            verbosity: Verbosity::default(),
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }

    /// Requested clip length in seconds, if `--time` was given.
    pub fn clip_duration(&self) -> Option<f64> {
        self.time.as_deref().and_then(|t| parse_duration(t).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(seek) = &self.seek {
            check_duration("--seek", seek)?;
        }
        if let Some(time) = &self.time {
            check_duration("--time", time)?;
            if parse_duration(time)? <= 0.0 {
                return Err(GifError::invalid_option("--time", "must be greater than zero"));
            }
        }
        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(GifError::invalid_option("--fps", "must be a positive number"));
            }
        }
        if self.width == Some(0) {
            return Err(GifError::invalid_option("--width", "must be at least 1 pixel"));
        }
        if let Some(palette) = self.palette {
            if !(MIN_PALETTE..=MAX_PALETTE).contains(&palette) {
                return Err(GifError::invalid_option(
                    "--palette",
                    format!("must be between {} and {}", MIN_PALETTE, MAX_PALETTE),
                ));
            }
        }
        self.eq.validate()?;
        if let Some(text) = &self.text {
            if text.text.is_empty() {
                return Err(GifError::invalid_option("--text", "must not be empty"));
            }
        }
        if same_file(&self.input, &self.output) {
            return Err(GifError::OutputConflict {
                path: self.output.clone(),
            });
        }
        Ok(())
    }
}

/// Output path for a conversion.
///
/// An explicit output gets `.gif` appended unless it already ends with it;
/// otherwise the GIF lands next to the input with the same stem.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(output) => {
            if output.to_string_lossy().ends_with(".gif") {
                output.to_path_buf()
            } else {
                let mut name = output.as_os_str().to_os_string();
                name.push(".gif");
                PathBuf::from(name)
            }
        }
        None => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            let mut name = stem.to_os_string();
            name.push(".gif");
            input.with_file_name(name)
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn check_duration(option: &'static str, value: &str) -> Result<()> {
    if is_valid_duration(value) {
        Ok(())
    } else {
        Err(GifError::invalid_option(
            option,
            format!(
                "'{}' is not a time duration (use seconds or HH:MM:SS.SS)",
                value
            ),
        ))
    }
}

fn check_range(option: &'static str, value: Option<f64>, min: f64, max: f64) -> Result<()> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(GifError::invalid_option(
            option,
            format!("{} is outside {} to {}", v, min, max),
        )),
        _ => Ok(()),
    }
}
