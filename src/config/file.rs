//! TOML configuration file loading
//!
//! Supports `~/.config/bloom/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::landmarks::LandmarkIndices;
use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct BloomConfigFile {
    /// Path to the catalogue file (TOML or JSON)
    #[serde(default)]
    pub catalogue: Option<String>,

    /// Mouth gesture thresholds and timeouts
    #[serde(default)]
    pub gesture: GestureFileConfig,

    /// Voice capture window limits
    #[serde(default)]
    pub capture: CaptureFileConfig,

    /// Fallback selection behaviour
    #[serde(default)]
    pub selection: SelectionFileConfig,

    /// Face-mesh indices for the named points
    #[serde(default)]
    pub landmarks: Option<LandmarkIndices>,

    /// Runtime loop settings
    #[serde(default)]
    pub runtime: RuntimeFileConfig,
}

/// Gesture debouncer configuration
#[derive(Debug, Default, Deserialize)]
pub struct GestureFileConfig {
    /// Lip gap (px) above which the mouth counts as open
    pub open_threshold: Option<f32>,

    /// Lip gap (px) below which the mouth counts as closed
    pub close_threshold: Option<f32>,

    /// Minimum time after a close before the mouth can reopen
    pub rearm_cooldown_ms: Option<u64>,

    /// Force-close after the mouth has been open this long
    pub max_open_ms: Option<u64>,

    /// After a forced close, require the mouth to shut before re-arming
    pub release_after_timeout: Option<bool>,
}

/// Capture window configuration
#[derive(Debug, Default, Deserialize)]
pub struct CaptureFileConfig {
    /// Minimum gap between two capture windows
    pub cooldown_ms: Option<u64>,

    /// Longest a capture window may stay open without a result
    pub max_duration_ms: Option<u64>,
}

/// Selection resolver configuration
#[derive(Debug, Default, Deserialize)]
pub struct SelectionFileConfig {
    /// "random" or "keep"
    pub timeout_fallback: Option<String>,

    /// Fixed RNG seed for reproducible fallbacks
    pub seed: Option<u64>,
}

/// Runtime loop configuration
#[derive(Debug, Default, Deserialize)]
pub struct RuntimeFileConfig {
    /// Periodic tick interval
    pub tick_ms: Option<u64>,
}

/// Load the TOML config file
///
/// With an explicit `path` the file must exist and parse. Without one, the
/// standard path is tried and `BloomConfigFile::default()` is returned if the
/// file doesn't exist or can't be parsed.
///
/// # Errors
///
/// Returns error if an explicitly requested file cannot be read or parsed
pub fn load_config_file(path: Option<&Path>) -> Result<BloomConfigFile> {
    if let Some(path) = path {
        return read_config_file(path);
    }

    match config_file_path() {
        Some(path) if path.exists() => Ok(read_config_file(&path).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "ignoring unusable config file, using defaults"
            );
            BloomConfigFile::default()
        })),
        _ => Ok(BloomConfigFile::default()),
    }
}

fn read_config_file(path: &Path) -> Result<BloomConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/bloom/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("bloom").join("config.toml"))
}
