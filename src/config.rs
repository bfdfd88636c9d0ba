//! Tool configuration.
//!
//! Loaded from YAML; every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```yaml
//! data_file: ips.txt.gz
//! family: 6
//! count: 1000000
//! seed: 42
//! load: build
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::address::AddressFamily;
use crate::error::{Error, Result};
use crate::index::LoadStrategy;

/// Default address file.
pub const DEFAULT_DATA_FILE: &str = "ips.txt";

/// Default number of generated addresses.
pub const DEFAULT_COUNT: u64 = 100_000;

/// Configuration for generating and querying address files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address file to generate into and load from
    pub data_file: PathBuf,
    /// Family of generated addresses
    pub family: AddressFamily,
    /// Number of generated addresses
    pub count: u64,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
    /// How the index is populated from the file
    pub load: LoadStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            family: AddressFamily::V4,
            count: DEFAULT_COUNT,
            seed: None,
            load: LoadStrategy::Build,
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_yaml(&text)
    }

    /// Load a configuration file if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(Error::Config("data_file must not be empty".to_string()));
        }
        Ok(())
    }
}
