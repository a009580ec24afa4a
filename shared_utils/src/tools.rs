//! External tools detection
//!
//! Thin layer over `which` so the rest of the workspace only asks
//! "is ffmpeg runnable?" and gets a typed error back.

use crate::errors::{GifError, Result};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Resolve `command` on `PATH` (honouring `PATHEXT` on Windows) or fail
/// with [`GifError::ToolNotFound`].
pub fn require_tool(command: &str) -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    require_tool_in(command, env::var_os("PATH"), &cwd)
}

/// Same as [`require_tool`] but searches an explicit `PATH`-style list.
pub fn require_tool_in<P: AsRef<OsStr>>(
    command: &str,
    paths: Option<P>,
    cwd: &Path,
) -> Result<PathBuf> {
    which::which_in(command, paths, cwd).map_err(|_| GifError::tool_not_found(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_found_when_on_path() {
        let bin = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        make_executable(bin.path(), "ffmpeg");

        let paths = env::join_paths([other.path(), bin.path()]).unwrap();
        let found = require_tool_in("ffmpeg", Some(&paths), other.path()).unwrap();
        assert_eq!(found, bin.path().join("ffmpeg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_not_found_when_missing_from_path() {
        let bin = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        make_executable(elsewhere.path(), "ffmpeg");

        let paths = env::join_paths([bin.path()]).unwrap();
        let err = require_tool_in("ffmpeg", Some(&paths), bin.path()).unwrap_err();
        assert!(matches!(err, GifError::ToolNotFound { ref tool } if tool == "ffmpeg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_plain_file_is_not_executable() {
        let bin = TempDir::new().unwrap();
        fs::write(bin.path().join("ffprobe"), "not a program").unwrap();

        let paths = env::join_paths([bin.path()]).unwrap();
        assert!(require_tool_in("ffprobe", Some(&paths), bin.path()).is_err());
    }

    #[test]
    fn test_require_tool_reports_name() {
        let err = require_tool("definitely-not-a-real-tool-4f1c").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tool-4f1c"));
    }
}
