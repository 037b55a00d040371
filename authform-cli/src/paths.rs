//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "authform";
const APPLICATION: &str = "authform";

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory for temporary/regenerable data.
///
/// - Linux: `$XDG_CACHE_HOME/authform` or `~/.cache/authform`
/// - macOS: `~/Library/Caches/dev.authform.authform`
/// - Windows: `C:\Users\<User>\AppData\Local\authform\authform\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the path to the log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("authform.log"))
}
