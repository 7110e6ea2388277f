//! Centralized configuration paths for brlkeys
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/brlkeys/`
//! - Windows: `%APPDATA%\brlkeys\`
//!
//! Device key tables are looked up in `keytables/` under that directory.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "brlkeys";

/// Base config directory for brlkeys
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/brlkeys`
///   - Else: `~/.config/brlkeys`
///
/// Windows:
///   - `%APPDATA%\brlkeys`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/brlkeys/keytables/`
pub fn key_tables_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keytables"))
}

/// Key table file of a device, preferring YAML over JSON when both exist
///
/// Returns the YAML path when neither exists.
pub fn key_table_file(device: &str) -> Option<PathBuf> {
    let dir = key_tables_dir()?;
    let yaml = dir.join(format!("{}.yaml", device));
    let json = dir.join(format!("{}.json", device));
    if !yaml.exists() && json.exists() {
        Some(json)
    } else {
        Some(yaml)
    }
}

/// `~/.config/brlkeys/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let config = ensure_config_dir()?;
    let logs = config.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}
