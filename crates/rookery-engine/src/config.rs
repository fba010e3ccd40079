//! Engine configuration.
//!
//! Everything a [`Position`](crate::Position) needs from outside comes
//! through [`EngineConfig`]: the variant, whether SAN is computed on every
//! move, the repetition table size and the Zobrist seed. Configurations are
//! plain TOML:
//!
//! ```toml
//! variant = "crazyhouse"
//! set_move_san = true
//! repetition_table_bits = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repetition::RepetitionTable;
use crate::rules::Variant;
use crate::zobrist::DEFAULT_SEED;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration as valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize the configuration.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The repetition table size is outside the supported range.
    #[error("repetition_table_bits must be within {min}..={max}, got {0}", min = EngineConfig::MIN_TABLE_BITS, max = EngineConfig::MAX_TABLE_BITS)]
    InvalidTableBits(u8),
}

/// Settings applied when a position is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Rule set. Defaults to classic chess.
    #[serde(default)]
    pub variant: Variant,
    /// Compute SAN for every applied move. Off by default since it costs a
    /// legal-move probe per move.
    #[serde(default)]
    pub set_move_san: bool,
    /// The repetition table holds `2^repetition_table_bits` counters.
    #[serde(default = "default_table_bits")]
    pub repetition_table_bits: u8,
    /// Seed for the Zobrist key table.
    #[serde(default = "default_zobrist_seed")]
    pub zobrist_seed: u64,
}

fn default_table_bits() -> u8 {
    RepetitionTable::DEFAULT_BITS
}

fn default_zobrist_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            variant: Variant::Classic,
            set_move_san: false,
            repetition_table_bits: default_table_bits(),
            zobrist_seed: default_zobrist_seed(),
        }
    }
}

impl EngineConfig {
    pub const MIN_TABLE_BITS: u8 = 4;
    pub const MAX_TABLE_BITS: u8 = 24;

    /// A default configuration for `variant`.
    pub fn for_variant(variant: Variant) -> Self {
        EngineConfig {
            variant,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown variant
    /// names, and [`ConfigError::InvalidTableBits`] for an out-of-range
    /// table size.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// whatever [`Self::from_toml_str`] returns.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (Self::MIN_TABLE_BITS..=Self::MAX_TABLE_BITS).contains(&self.repetition_table_bits) {
            Ok(())
        } else {
            Err(ConfigError::InvalidTableBits(self.repetition_table_bits))
        }
    }

    /// The table size actually used, clamped into the supported range.
    pub(crate) fn table_bits(&self) -> u8 {
        self.repetition_table_bits
            .clamp(Self::MIN_TABLE_BITS, Self::MAX_TABLE_BITS)
    }
}
