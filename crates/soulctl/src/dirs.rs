//! Platform-specific directory utilities

use std::path::PathBuf;

/// Get the platform-specific data directory for soul point records
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/soulpoints`
/// - Linux: `~/.local/share/soulpoints` (or `$XDG_DATA_HOME/soulpoints`)
/// - Windows: `%APPDATA%\soulpoints`
/// - Fallback: `./soul_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "soulpoints")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./soul_data"))
}

/// Get the platform-specific config directory
///
/// - Linux: `~/.config/soulpoints` (or `$XDG_CONFIG_HOME/soulpoints`)
/// - Fallback: `.`
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "soulpoints")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
