//! Analysis settings, loadable from a TOML file.
//!
//! ```toml
//! [strings]
//! min_length = 6
//!
//! [output]
//! write_listings = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::DEFAULT_MIN_STRING_LEN;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("strings.min_length must be at least 1")]
    ZeroMinLength,

    #[error("output.write_sidecars requires output.write_binaries")]
    SidecarsWithoutBinaries,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub strings: StringsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StringsConfig {
    pub min_length: usize,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_STRING_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub write_binaries: bool,
    pub write_sidecars: bool,
    pub write_listings: bool,
    pub write_filtered_hex: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_binaries: true,
            write_sidecars: true,
            write_listings: true,
            write_filtered_hex: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strings.min_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if self.output.write_sidecars && !self.output.write_binaries {
            return Err(ConfigError::SidecarsWithoutBinaries);
        }
        Ok(())
    }
}
