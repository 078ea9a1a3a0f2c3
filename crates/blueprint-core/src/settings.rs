//! File-based settings
//!
//! [`Settings`] describes a configuration declaratively so fixture setup can
//! live next to the tests in a TOML file:
//!
//! ```toml
//! preset = "random"
//! seed = 42
//! array_length = 3
//! max_string_length = 8
//! populate_public_fields = true
//! proxy_policy = "plain"
//! ```

use crate::checks;
use crate::config::{Configuration, ProxyPolicy};
use crate::creation::{DEFAULT_ARRAY_LENGTH, DEFAULT_MAX_STRING_LENGTH};
use crate::error::BlueprintError;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings loading errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("cannot read settings from {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or unknown keys
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed but inconsistent values
    #[error(transparent)]
    Invalid(#[from] BlueprintError),
}

/// Base preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Zero values and first enum constants
    #[default]
    #[serde(rename = "default", alias = "deterministic")]
    Deterministic,
    /// Random values
    Random,
}

/// Declarative configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base preset
    pub preset: Preset,
    /// Length of synthesized arrays
    pub array_length: usize,
    /// Upper bound on random string length
    pub max_string_length: usize,
    /// Whether public mutable fields are populated
    pub populate_public_fields: bool,
    /// Dispatch policy for interfaces
    pub proxy_policy: ProxyPolicy,
    /// Seed for the random preset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Deterministic,
            array_length: DEFAULT_ARRAY_LENGTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            populate_public_fields: false,
            proxy_policy: ProxyPolicy::Cached,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML
    ///
    /// # Errors
    /// Returns error on malformed TOML, unknown keys or invalid values
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a settings file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading settings");
        Self::from_toml_str(&text)
    }

    /// Check value consistency
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidArgument`] naming the offending key
    pub fn validate(&self) -> Result<(), BlueprintError> {
        checks::require_positive(self.array_length, "array_length")?;
        checks::require_positive(self.max_string_length, "max_string_length")?;
        if self.seed.is_some() && self.preset != Preset::Random {
            return Err(BlueprintError::invalid_argument(
                "seed",
                "only applies to the random preset",
            ));
        }
        Ok(())
    }

    /// With preset
    #[inline]
    #[must_use]
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// With seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Configuration {
    /// Build a configuration from settings
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidArgument`] if the settings are invalid
    pub fn from_settings(settings: &Settings) -> Result<Self, BlueprintError> {
        settings.validate()?;
        let base = match settings.preset {
            Preset::Deterministic => Self::deterministic(),
            Preset::Random => {
                let source = settings
                    .seed
                    .map_or_else(RandomSource::process, RandomSource::seeded);
                Self::random_from(source, settings.max_string_length)
            }
        };
        let mut config = base
            .with_public_fields(settings.populate_public_fields)
            .with_proxy_policy(settings.proxy_policy);
        if settings.array_length != DEFAULT_ARRAY_LENGTH {
            config = config.with_array_length(settings.array_length);
        }
        Ok(config)
    }
}

impl TryFrom<&Settings> for Configuration {
    type Error = BlueprintError;

    fn try_from(settings: &Settings) -> Result<Self, Self::Error> {
        Self::from_settings(settings)
    }
}
