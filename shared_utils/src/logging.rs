//! Logging Module - unified tracing setup
//!
//! Logs go to two sinks:
//! - stderr, coloured, for the person running the converter
//! - a daily-rolled file in the system temp dir, for post-mortems
//!
//! `RUST_LOG` always wins over the level derived from `--quiet` / `--verbose`.
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig, Verbosity};
//!
//! let config = LogConfig::default().with_verbosity(Verbosity::Verbose);
//! init_logging("vid_gif", config).expect("Failed to initialize logging");
//! tracing::info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How chatty the converter should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Nothing at all, not even warnings.
    Quiet,
    #[default]
    Normal,
    /// Executed commands and every line of child process output.
    Verbose,
}

impl Verbosity {
    /// `quiet` overrides `verbose`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Verbosity::Quiet,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::OFF,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::DEBUG,
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }

    pub fn is_verbose(self) -> bool {
        self == Verbosity::Verbose
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for the rolling log file (system temp dir by default)
    pub log_dir: PathBuf,
    /// Number of rolled log files to keep
    pub max_files: usize,
    pub level: LevelFilter,
    /// Disable the file sink entirely
    pub file_logging: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: LevelFilter::INFO,
            file_logging: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        self.with_level(verbosity.level())
    }

    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.file_logging = enabled;
        self
    }

    /// Default directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self, program_name: &str) -> String {
        format!(
            "{program}={level},shared_utils={level}",
            program = program_name,
            level = self.level.to_string().to_lowercase()
        )
    }
}

/// Install the global tracing subscriber.
///
/// Log file name: `{program_name}.log.<date>` inside `config.log_dir`.
/// Fails if a global subscriber is already installed.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive(program_name)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false);

    let log_file_name = format!("{}.log", program_name);

    let file_layer = if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

        Some(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = %config.level,
        "Logging system initialized"
    );

    if config.file_logging {
        cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;
    }

    Ok(())
}

/// Keep only the `max_files` most recently modified `{program_name}.log*` files.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let prefix = format!("{}.log", program_name);

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with(&prefix))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    if log_files.len() > max_files {
        // newest first
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

/// Record the outcome of one external tool invocation.
pub fn log_external_tool(
    tool_name: &str,
    command: &str,
    exit_code: Option<i32>,
    duration: std::time::Duration,
) {
    match exit_code {
        Some(0) => {
            tracing::debug!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = 0,
                "External tool completed successfully"
            );
        }
        Some(code) => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                "External tool failed"
            );
        }
        None => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                "External tool terminated without exit code"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.max_files, 5);
        assert_eq!(config.level, LevelFilter::INFO);
        assert!(config.file_logging);
    }

    #[test]
    fn test_log_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path())
            .with_max_files(3)
            .with_verbosity(Verbosity::Verbose)
            .with_file_logging(false);

        assert_eq!(config.log_dir, temp_dir.path());
        assert_eq!(config.max_files, 3);
        assert_eq!(config.level, LevelFilter::DEBUG);
        assert!(!config.file_logging);
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::Quiet.level(), LevelFilter::OFF);
    }

    #[test]
    fn test_default_directive_covers_shared_utils() {
        let config = LogConfig::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(
            config.default_directive("vid_gif"),
            "vid_gif=debug,shared_utils=debug"
        );
    }

    #[test]
    fn test_cleanup_old_logs() {
        let temp_dir = TempDir::new().unwrap();
        let program_name = "test_program";

        for i in 0..10 {
            let file_path = temp_dir
                .path()
                .join(format!("{}.log.2026-01-{:02}", program_name, i + 1));
            fs::write(&file_path, format!("log content {}", i)).unwrap();
            // distinct mtimes
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        fs::write(temp_dir.path().join("unrelated.txt"), "keep me").unwrap();

        cleanup_old_logs(temp_dir.path(), program_name, 3).unwrap();

        let remaining_logs: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(program_name))
            .collect();

        assert_eq!(remaining_logs.len(), 3);
        assert!(temp_dir.path().join("unrelated.txt").exists());
    }
}
