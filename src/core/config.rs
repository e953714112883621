//! Codec configuration.
//!
//! The codec reads the `[mirai-codec]` section of a TOML document, so its
//! settings can share a file with the rest of a bot's config. Other sections
//! are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::message::{CodecOptions, DEFAULT_MAX_DEPTH, TimestampUnit, UnknownElementPolicy};

/// `[mirai-codec]` section.
///
/// ```toml
/// [mirai-codec]
/// unknown_elements = "passthrough"
/// timestamp_unit = "milliseconds"
/// max_depth = 16   # 0 disables the limit
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub unknown_elements: UnknownElementPolicy,

    #[serde(default)]
    pub timestamp_unit: TimestampUnit,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            unknown_elements: UnknownElementPolicy::default(),
            timestamp_unit: TimestampUnit::default(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl CodecConfig {
    pub const SECTION: &'static str = "mirai-codec";

    /// Reads the section from TOML text. A document without it gives defaults.
    pub fn parse(content: &str) -> Result<Self> {
        let mut document: toml::Table = toml::from_str(content).context("Failed to parse TOML")?;

        let Some(section) = document.remove(Self::SECTION) else {
            debug!("No [{}] section, using defaults", Self::SECTION);
            return Ok(Self::default());
        };

        debug!("Loading config section: {}", Self::SECTION);
        section
            .try_into()
            .with_context(|| format!("Invalid config section '{}'", Self::SECTION))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading codec configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("In '{}'", path.display()))
    }

    pub fn options(&self) -> CodecOptions {
        CodecOptions::new()
            .unknown_elements(self.unknown_elements)
            .timestamp_unit(self.timestamp_unit)
            .max_depth((self.max_depth != 0).then_some(self.max_depth))
    }
}
