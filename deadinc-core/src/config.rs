//! Configuration loading from deadinc.toml.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{fs, path::Path};

use crate::error::{DeadincError, IoResultExt};

/// Naming conventions and filters the liveness pass applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Includes resolving under any of these prefixes are never tracked.
    pub system_prefixes: Vec<String>,
    /// Only includes ending in one of these are tracked.
    pub header_suffixes: Vec<String>,
    /// Stripped from the main file name to find its own headers.
    pub source_suffixes: Vec<String>,
    /// Appended to the main file stem; matching includes start out used.
    pub self_header_suffixes: Vec<String>,
    /// Marks a private header whose use implies its public sibling.
    pub private_suffix: String,
    /// Suffix of the public sibling of a private header.
    pub public_suffix: String,
    /// Report both diagnostic kinds as errors.
    pub warnings_as_errors: bool,
    /// Translation units whose main file lives under these are not analyzed.
    pub skipped_unit_prefixes: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            system_prefixes: vec!["/usr/".to_string()],
            header_suffixes: vec![".h".to_string()],
            source_suffixes: vec![".c".to_string()],
            self_header_suffixes: vec![".h".to_string(), "_api.h".to_string()],
            private_suffix: "_private.h".to_string(),
            public_suffix: "_api.h".to_string(),
            warnings_as_errors: false,
            skipped_unit_prefixes: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Stable digest of every setting that can change a verdict.
    ///
    /// Cached results are only reused under an identical fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut sha = Sha256::new();
        for list in [
            &self.system_prefixes,
            &self.header_suffixes,
            &self.source_suffixes,
            &self.self_header_suffixes,
            &self.skipped_unit_prefixes,
        ] {
            for item in list {
                sha.update(item.as_bytes());
                sha.update([0u8]);
            }
            sha.update([0xffu8]);
        }
        sha.update(self.private_suffix.as_bytes());
        sha.update([0u8]);
        sha.update(self.public_suffix.as_bytes());
        sha.update([self.warnings_as_errors as u8]);
        format!("{:x}", sha.finalize())
    }
}

/// Main configuration structure for deadinc.toml.
#[derive(Debug, Deserialize, Default)]
pub struct DeadincConfig {
    /// Analyzer conventions and filters.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Diagnostics whose file contains any of these substrings are dropped.
    pub ignore: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Loads configuration from deadinc.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadincConfig>> {
    let path = root.join("deadinc.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit file.
///
/// Fails with [`DeadincError::Io`] when unreadable and
/// [`DeadincError::Config`] when the TOML is invalid.
pub fn load_config_file(path: &Path) -> Result<DeadincConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    let cfg = toml::from_str(&content).map_err(|e| DeadincError::config(path, e.to_string()))?;
    Ok(cfg)
}
