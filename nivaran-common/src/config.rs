//! Configuration file resolution
//!
//! Config path resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-platform default location
//!
//! On Linux the default locations are `~/.config/nivaran/config.toml` then
//! `/etc/nivaran/config.toml`; macOS and Windows use the platform config
//! directory reported by `dirs`.

use std::path::PathBuf;

/// Resolve the configuration file path for a service.
///
/// Explicit paths (CLI argument or environment variable) are returned as
/// given, whether or not the file exists: a missing explicit path should
/// surface as a load error, not silently fall through to defaults. Default
/// locations are only returned when present on disk.
pub fn resolve_config_path(cli_arg: Option<&str>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Per-platform default locations
    default_config_path()
}

/// Get the default configuration file path for the platform, if one exists
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("nivaran").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/nivaran/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
