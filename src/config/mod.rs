//! Configuration management for Bloom gateway
//!
//! Every threshold and timeout the interaction controller uses is a tunable
//! here; none are baked into the algorithms.

pub mod file;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::landmarks::LandmarkIndices;
use crate::selection::FallbackPolicy;
use crate::{Error, Result};

/// Bloom gateway configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Mouth gesture debouncing
    pub gesture: GestureConfig,

    /// Voice capture window limits
    pub capture: CaptureConfig,

    /// Fallback selection behaviour
    pub selection: SelectionConfig,

    /// Face-mesh indices for the named points
    pub landmarks: LandmarkIndices,

    /// Catalogue file; the built-in catalogue is used when unset
    pub catalogue_path: Option<PathBuf>,

    /// Runtime loop settings
    pub runtime: RuntimeConfig,
}

/// Gesture debouncer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Lip gap above which a closed mouth opens
    pub open_threshold: f32,

    /// Lip gap below which an open mouth closes; must sit below `open_threshold`
    pub close_threshold: f32,

    /// Minimum time after a close before the mouth can reopen
    pub rearm_cooldown: Duration,

    /// Force-close after the mouth has been open this long
    pub max_open: Duration,

    /// After a forced close, require the gap to drop below `close_threshold`
    /// before the mouth can reopen
    pub release_after_timeout: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_threshold: 12.0,
            close_threshold: 8.0,
            rearm_cooldown: Duration::from_millis(500),
            max_open: Duration::from_millis(10_000),
            release_after_timeout: false,
        }
    }
}

/// Capture window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Minimum gap between the end of one window and the start of the next
    pub cooldown: Duration,

    /// Longest a window may stay open without a recognized phrase
    pub max_duration: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(500),
            max_duration: Duration::from_millis(10_000),
        }
    }
}

/// Selection resolver configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionConfig {
    /// What a timed-out capture does to the selection
    pub timeout_fallback: FallbackPolicy,

    /// Fixed RNG seed; entropy-seeded when unset
    pub seed: Option<u64>,
}

/// Runtime loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Periodic tick interval
    pub tick_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(33),
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be loaded or the
    /// resulting values are inconsistent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file overlay and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if an env value cannot be parsed or validation fails
    pub fn from_sources<F>(fc: file::BloomConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GestureConfig::default();
        let gesture = GestureConfig {
            open_threshold: env_parse(&env, "BLOOM_OPEN_THRESHOLD")?
                .or(fc.gesture.open_threshold)
                .unwrap_or(defaults.open_threshold),
            close_threshold: env_parse(&env, "BLOOM_CLOSE_THRESHOLD")?
                .or(fc.gesture.close_threshold)
                .unwrap_or(defaults.close_threshold),
            rearm_cooldown: env_millis(&env, "BLOOM_REARM_COOLDOWN_MS")?
                .or(fc.gesture.rearm_cooldown_ms.map(Duration::from_millis))
                .unwrap_or(defaults.rearm_cooldown),
            max_open: env_millis(&env, "BLOOM_MAX_OPEN_MS")?
                .or(fc.gesture.max_open_ms.map(Duration::from_millis))
                .unwrap_or(defaults.max_open),
            release_after_timeout: fc
                .gesture
                .release_after_timeout
                .unwrap_or(defaults.release_after_timeout),
        };

        let defaults = CaptureConfig::default();
        let capture = CaptureConfig {
            cooldown: env_millis(&env, "BLOOM_CAPTURE_COOLDOWN_MS")?
                .or(fc.capture.cooldown_ms.map(Duration::from_millis))
                .unwrap_or(defaults.cooldown),
            max_duration: env_millis(&env, "BLOOM_MAX_CAPTURE_MS")?
                .or(fc.capture.max_duration_ms.map(Duration::from_millis))
                .unwrap_or(defaults.max_duration),
        };

        let timeout_fallback = env("BLOOM_TIMEOUT_FALLBACK")
            .or(fc.selection.timeout_fallback)
            .map(|s| FallbackPolicy::from_str(&s))
            .transpose()?
            .unwrap_or_default();
        let selection = SelectionConfig {
            timeout_fallback,
            seed: env_parse(&env, "BLOOM_SEED")?.or(fc.selection.seed),
        };

        let runtime = RuntimeConfig {
            tick_interval: env_millis(&env, "BLOOM_TICK_MS")?
                .or(fc.runtime.tick_ms.map(Duration::from_millis))
                .unwrap_or_else(|| RuntimeConfig::default().tick_interval),
        };

        let catalogue_path = env("BLOOM_CATALOGUE")
            .or(fc.catalogue)
            .map(PathBuf::from);

        let config = Self {
            gesture,
            capture,
            selection,
            landmarks: fc.landmarks.unwrap_or_default(),
            catalogue_path,
            runtime,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that the values are usable together
    ///
    /// # Errors
    ///
    /// Returns error describing the first inconsistent value
    pub fn validate(&self) -> Result<()> {
        let g = &self.gesture;
        if !(g.open_threshold.is_finite() && g.close_threshold.is_finite()) {
            return Err(Error::Config("gesture thresholds must be finite".to_string()));
        }
        if g.close_threshold <= 0.0 {
            return Err(Error::Config(format!(
                "close_threshold must be positive, got {}",
                g.close_threshold
            )));
        }
        if g.close_threshold >= g.open_threshold {
            return Err(Error::Config(format!(
                "close_threshold ({}) must be below open_threshold ({})",
                g.close_threshold, g.open_threshold
            )));
        }
        if g.max_open.is_zero() {
            return Err(Error::Config("max_open must be non-zero".to_string()));
        }
        if self.capture.max_duration.is_zero() {
            return Err(Error::Config("capture max_duration must be non-zero".to_string()));
        }
        if self.runtime.tick_interval.is_zero() {
            return Err(Error::Config("tick interval must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn env_parse<F, T>(env: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{key}: cannot parse {raw:?}")))
        })
        .transpose()
}

fn env_millis<F>(env: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(env_parse::<F, u64>(env, key)?.map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(file::BloomConfigFile::default(), no_env).unwrap();
        assert_eq!(config.gesture, GestureConfig::default());
        assert!(!config.gesture.release_after_timeout);
        assert_eq!(config.capture, CaptureConfig::default());
        assert_eq!(config.selection.timeout_fallback, FallbackPolicy::Random);
        assert!(config.catalogue_path.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: file::BloomConfigFile = toml::from_str(
            r"
            [gesture]
            open_threshold = 5.0
            close_threshold = 4.0
            max_open_ms = 2000
            ",
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("BLOOM_OPEN_THRESHOLD", "3.0"),
            ("BLOOM_CLOSE_THRESHOLD", "2.0"),
            ("BLOOM_TIMEOUT_FALLBACK", "keep"),
            ("BLOOM_SEED", "42"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::from_sources(fc, |k| env.get(k).map(ToString::to_string)).unwrap();
        assert!((config.gesture.open_threshold - 3.0).abs() < f32::EPSILON);
        assert!((config.gesture.close_threshold - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.gesture.max_open, Duration::from_millis(2000));
        assert_eq!(config.selection.timeout_fallback, FallbackPolicy::KeepCurrent);
        assert_eq!(config.selection.seed, Some(42));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let fc: file::BloomConfigFile = toml::from_str(
            r"
            [gesture]
            open_threshold = 2.0
            close_threshold = 3.0
            ",
        )
        .unwrap();
        assert!(matches!(
            Config::from_sources(fc, no_env),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let result = Config::from_sources(file::BloomConfigFile::default(), |k| {
            (k == "BLOOM_MAX_OPEN_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_fallback_rejected() {
        let result = Config::from_sources(file::BloomConfigFile::default(), |k| {
            (k == "BLOOM_TIMEOUT_FALLBACK").then(|| "sometimes".to_string())
        });
        assert!(result.is_err());
    }
}
