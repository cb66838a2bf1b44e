//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the software root (the directory which contains `params/`
/// and `sessions/`).
pub const ROOT_ENV_VAR: &str = "PATH_EDITOR_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory.
///
/// If the `PATH_EDITOR_ROOT` environment variable is not set the current working directory is
/// used instead.
pub fn get_path_editor_root() -> std::io::Result<PathBuf> {
    match env::var_os(ROOT_ENV_VAR) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => env::current_dir(),
    }
}
