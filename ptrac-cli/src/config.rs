//! Configuration loading and parsing

use anyhow::{Context, Result};
use ptrac_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Directory for converted files (default: current directory)
    pub output_dir: Option<PathBuf>,
    /// Stop each file after this many histories
    pub max_histories: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per history
    #[default]
    Jsonl,
    /// Re-emit ASCII PTRAC
    Ptrac,
    /// Summary report only
    None,
}

impl OutputFormat {
    /// Extension of the converted file, if one is written
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Jsonl => Some("jsonl"),
            OutputFormat::Ptrac => Some("ptrac"),
            OutputFormat::None => None,
        }
    }
}

impl AppConfig {
    /// Output path for one input, `None` when no converted file is written
    pub fn output_path(&self, input: &Path) -> Option<PathBuf> {
        let extension = self.output.format.extension()?;
        let stem = input.file_stem()?;
        let dir = self
            .output
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Some(dir.join(format!("{}.{}", stem.to_string_lossy(), extension)))
    }
}

/// Whether `output` names the same file as the existing `input`
///
/// Both paths are resolved first, so `slab.ptrac`, `./slab.ptrac` and
/// `runs/../slab.ptrac` all match. An output that does not exist yet cannot
/// be the input.
pub fn is_same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
