use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifError {
    #[error("Requires {tool} to be installed (not found on PATH)")]
    ToolNotFound { tool: String },

    #[error("Specified video file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Invalid value for {option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },

    #[error("Output would overwrite the input video: {}", path.display())]
    OutputConflict { path: PathBuf },

    #[error("Process {pid} failed! Try again with --verbose to see error. ({tool}: {detail})")]
    ProcessFailed {
        tool: String,
        pid: u32,
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("Could not parse {tool} output: {reason}")]
    ProbeParse { tool: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GifError {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        GifError::ToolNotFound { tool: tool.into() }
    }

    pub fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        GifError::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GifError>;
