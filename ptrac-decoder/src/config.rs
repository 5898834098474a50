//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library.
//! Everything here is supplied by the caller: the PTRAC file does not describe
//! how many echoed input lines its header carries.

use crate::format::SchemaVersion;
use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Number of echoed input lines in the header (10 reals each)
    #[serde(default)]
    pub input_lines: usize,

    /// Maximum number of steps in a single history (default: 1000)
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Code name expected on the second header line (default: "mcnp")
    #[serde(default = "default_expected_code")]
    pub expected_code: String,

    /// Header layout revision
    #[serde(default)]
    pub schema: SchemaVersion,
}

fn default_max_steps() -> usize {
    1000
}

fn default_expected_code() -> String {
    "mcnp".to_string()
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            input_lines: 0,
            max_steps: default_max_steps(),
            expected_code: default_expected_code(),
            schema: SchemaVersion::default(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of echoed input lines
    pub fn with_input_lines(mut self, input_lines: usize) -> Self {
        self.input_lines = input_lines;
        self
    }

    /// Builder method: set the per-history step limit
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method: set the expected code name
    pub fn with_expected_code(mut self, code: impl Into<String>) -> Self {
        self.expected_code = code.into();
        self
    }

    /// Builder method: select the header layout revision
    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_builder() {
        let config = DecoderConfig::new()
            .with_input_lines(3)
            .with_max_steps(50)
            .with_expected_code("mcnpx")
            .with_schema(SchemaVersion::NoBank);

        assert_eq!(config.input_lines, 3);
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.expected_code, "mcnpx");
        assert_eq!(config.schema, SchemaVersion::NoBank);
    }

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::new();
        assert_eq!(config.input_lines, 0);
        assert_eq!(config.max_steps, 1000);
        assert_eq!(config.expected_code, "mcnp");
        assert_eq!(config.schema, SchemaVersion::Standard);
    }
}
