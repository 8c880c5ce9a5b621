//! Incremental result cache using SHA-256 change detection.
//!
//! Performance characteristics:
//! - Parallel hashing and analysis via Rayon
//! - Read-once pattern: each event file is read once, then hashed and replayed
//! - O(changed_units) analysis work, O(1) cache lookups
//!
//! A unit's report is reused when its event stream hashes the same and the
//! analyzer configuration fingerprint matches the one the cache was built
//! with. Reports that skipped malformed lines are only reused by resilient
//! runs; a strict run replays the stream and fails on it.
//!
//! # Cache Versioning
//!
//! The cache is dropped when:
//! - the cache format version changes
//! - the deadinc major version changes
//! - the analyzer configuration changes

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::analyzer::UnitReport;
use crate::builder::UnitOutcome;
use crate::config::AnalyzerConfig;
use crate::file_id::normalize_path_string;
use crate::stream::{analyze_events, StreamMode};

/// Maximum cache file size (50MB) - prevents unbounded cache growth
const MAX_CACHE_SIZE_BYTES: usize = 50_000_000;

/// Current cache format version. Increment when cache format changes.
const CACHE_VERSION: u32 = 2;

/// Deadinc version for cache compatibility checking.
const DEADINC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory (under the analysis root) holding the cache.
pub const CACHE_DIR: &str = ".deadinc";

/// Cached report of one event stream.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedUnit {
    pub hash: String,
    pub report: UnitReport,
}

/// Cache metadata for version checking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CacheMetadata {
    /// Cache format version
    pub cache_version: u32,
    /// Deadinc version that created this cache
    pub deadinc_version: String,
    /// Seconds since the epoch when the cache was written
    #[serde(default)]
    pub created_at: u64,
    /// Fingerprint of the analyzer configuration the reports were built with
    #[serde(default)]
    pub config_fingerprint: String,
}

impl CacheMetadata {
    /// Create metadata for the current environment and configuration.
    pub fn current(config: &AnalyzerConfig) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            cache_version: CACHE_VERSION,
            deadinc_version: DEADINC_VERSION.to_string(),
            created_at,
            config_fingerprint: config.fingerprint(),
        }
    }

    /// Check if this cache can serve results for `config`.
    pub fn is_compatible(&self, config: &AnalyzerConfig) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }

        let current_major = DEADINC_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.deadinc_version.split('.').next().unwrap_or("0");
        if current_major != cached_major {
            return false;
        }

        self.config_fingerprint == config.fingerprint()
    }
}

/// The full cache model, stored in `.deadinc/cache.json`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DeadincCache {
    #[serde(default)]
    pub metadata: CacheMetadata,
    /// Maps event file path to its cached report.
    pub units: HashMap<String, CachedUnit>,
}

#[inline]
fn hash_bytes(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    format!("{:x}", sha.finalize())
}

#[inline]
fn cache_key(path: &Path) -> String {
    normalize_path_string(&path.display().to_string())
}

/// Load the cache from `.deadinc/cache.json`.
///
/// Returns `None` if the file is missing, corrupted, or incompatible with
/// the current version or `config`.
pub fn load_cache(root: &Path, config: &AnalyzerConfig) -> Option<DeadincCache> {
    let path = root.join(CACHE_DIR).join("cache.json");
    if !path.exists() {
        return None;
    }

    let text = fs::read_to_string(&path).ok()?;
    let cache: DeadincCache = match serde_json::from_str(&text) {
        Ok(cache) => cache,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupted cache ignored");
            return None;
        }
    };

    if !cache.metadata.is_compatible(config) {
        info!(
            cached_version = %cache.metadata.deadinc_version,
            current_version = DEADINC_VERSION,
            "cache incompatible, rebuilding"
        );
        let _ = fs::remove_file(&path);
        return None;
    }

    Some(cache)
}

/// Save the cache to disk with a temp-file-and-rename write.
pub fn save_cache(root: &Path, cache: &DeadincCache) -> Result<()> {
    let dir = root.join(CACHE_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
    }

    let path = dir.join("cache.json");
    let json = serde_json::to_string_pretty(cache)?;

    if json.len() > MAX_CACHE_SIZE_BYTES {
        warn!(
            limit_mb = MAX_CACHE_SIZE_BYTES / 1_000_000,
            "cache exceeds size limit, clearing"
        );
        let _ = fs::remove_file(&path);
        return Ok(());
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!("cache.json.{}.{}.tmp", std::process::id(), nanos));

    fs::write(&temp_path, &json)
        .with_context(|| format!("Failed to write temp cache file: {}", temp_path.display()))?;

    fs::rename(&temp_path, &path).with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to rename cache file to: {}", path.display())
    })?;

    Ok(())
}

/// A report built by skipping malformed lines must not satisfy a strict run.
#[inline]
fn serves_mode(report: &UnitReport, mode: StreamMode) -> bool {
    mode == StreamMode::Resilient || report.skipped_lines == 0
}

/// Read, hash, and analyze one event file unless the cache already has it.
fn process_file(
    file: &Path,
    old_cache: Option<&DeadincCache>,
    config: &AnalyzerConfig,
    mode: StreamMode,
) -> (UnitOutcome, Option<CachedUnit>) {
    let content = match fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            let outcome = UnitOutcome::failed(file, crate::DeadincError::io(file, e));
            return (outcome, None);
        }
    };

    let hash = hash_bytes(content.as_bytes());

    if let Some(cached) = old_cache.and_then(|old| old.units.get(&cache_key(file))) {
        if cached.hash == hash && serves_mode(&cached.report, mode) {
            let outcome = UnitOutcome::analyzed(file, cached.report.clone(), true);
            return (outcome, Some(cached.clone()));
        }
    }

    match analyze_events(file, &content, config, mode) {
        Ok(report) => {
            let entry = CachedUnit {
                hash,
                report: report.clone(),
            };
            (UnitOutcome::analyzed(file, report, false), Some(entry))
        }
        Err(e) => (UnitOutcome::failed(file, e), None),
    }
}

/// Analyze `files`, reusing cached reports for unchanged streams.
///
/// Units are independent, so they run in parallel; each gets its own
/// analysis state. The refreshed cache is saved best-effort.
pub fn incremental_analyze(
    root: &Path,
    files: &[PathBuf],
    old_cache: Option<DeadincCache>,
    config: &AnalyzerConfig,
    mode: StreamMode,
) -> Vec<UnitOutcome> {
    let results: Vec<(UnitOutcome, Option<CachedUnit>)> = files
        .par_iter()
        .map(|file| process_file(file, old_cache.as_ref(), config, mode))
        .collect();

    let mut new_cache = DeadincCache {
        metadata: CacheMetadata::current(config),
        units: HashMap::with_capacity(results.len()),
    };

    let mut outcomes = Vec::with_capacity(results.len());
    for (outcome, entry) in results {
        if let Some(entry) = entry {
            new_cache.units.insert(cache_key(&outcome.source), entry);
        }
        outcomes.push(outcome);
    }

    if let Err(e) = save_cache(root, &new_cache) {
        warn!(error = %e, "cache save failed");
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("deadinc_cache_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const UNIT: &str = r#"{"event":"main_file","path":"main.c"}
{"event":"include","file":"dead.h","line":1}
"#;

    #[test]
    fn test_hash_bytes_deterministic() {
        let a = hash_bytes(UNIT.as_bytes());
        assert_eq!(a, hash_bytes(UNIT.as_bytes()));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_load_cache_not_found() {
        let dir = create_temp_dir("not_found");
        assert!(load_cache(&dir, &AnalyzerConfig::default()).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fresh_then_cached() {
        let dir = create_temp_dir("fresh_then_cached");
        let file = dir.join("main.events.jsonl");
        fs::write(&file, UNIT).unwrap();
        let config = AnalyzerConfig::default();
        let files = vec![file.clone()];

        let first = incremental_analyze(&dir, &files, None, &config, StreamMode::Resilient);
        assert!(!first[0].from_cache);
        assert_eq!(first[0].report().unwrap().diagnostics.len(), 1);

        let cache = load_cache(&dir, &config);
        assert!(cache.is_some());
        let second = incremental_analyze(&dir, &files, cache, &config, StreamMode::Resilient);
        assert!(second[0].from_cache);
        assert_eq!(
            first[0].report().unwrap(),
            second[0].report().unwrap()
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_changed_stream_reanalyzed() {
        let dir = create_temp_dir("changed");
        let file = dir.join("main.events.jsonl");
        fs::write(&file, UNIT).unwrap();
        let config = AnalyzerConfig::default();
        let files = vec![file.clone()];
        incremental_analyze(&dir, &files, None, &config, StreamMode::Resilient);

        fs::write(
            &file,
            format!("{}{}\n", UNIT, r#"{"event":"macro_use","definition_file":"dead.h","line":2}"#),
        )
        .unwrap();
        let cache = load_cache(&dir, &config);
        let outcomes = incremental_analyze(&dir, &files, cache, &config, StreamMode::Resilient);
        assert!(!outcomes[0].from_cache);
        assert!(outcomes[0].report().unwrap().diagnostics.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_change_invalidates() {
        let dir = create_temp_dir("config_change");
        let file = dir.join("main.events.jsonl");
        fs::write(&file, UNIT).unwrap();
        let files = vec![file];
        incremental_analyze(&dir, &files, None, &AnalyzerConfig::default(), StreamMode::Resilient);

        let mut strict = AnalyzerConfig::default();
        strict.warnings_as_errors = true;
        assert!(load_cache(&dir, &strict).is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lossy_report_not_reused_by_strict_run() {
        let dir = create_temp_dir("lossy_strict");
        let file = dir.join("u.events.jsonl");
        fs::write(&file, "{\"event\":\"main_file\",\"path\":\"main.c\"}\n{not json}\n").unwrap();
        let config = AnalyzerConfig::default();
        let files = vec![file];

        let resilient =
            incremental_analyze(&dir, &files, None, &config, StreamMode::Resilient);
        assert_eq!(resilient[0].report().unwrap().skipped_lines, 1);

        let cache = load_cache(&dir, &config);
        let strict = incremental_analyze(&dir, &files, cache, &config, StreamMode::Strict);
        assert!(!strict[0].from_cache);
        assert!(strict[0].result.is_err());

        let cache = load_cache(&dir, &config);
        assert!(cache.is_some());
        let again = incremental_analyze(&dir, &files, cache, &config, StreamMode::Resilient);
        assert!(again[0].report().is_some());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clean_report_reused_by_strict_run() {
        let dir = create_temp_dir("clean_strict");
        let file = dir.join("main.events.jsonl");
        fs::write(&file, UNIT).unwrap();
        let config = AnalyzerConfig::default();
        let files = vec![file];
        incremental_analyze(&dir, &files, None, &config, StreamMode::Resilient);

        let cache = load_cache(&dir, &config);
        let strict = incremental_analyze(&dir, &files, cache, &config, StreamMode::Strict);
        assert!(strict[0].from_cache);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_units_not_cached() {
        let dir = create_temp_dir("failed");
        let file = dir.join("bad.events.jsonl");
        fs::write(&file, r#"{"event":"end_of_unit"}"#).unwrap();
        let config = AnalyzerConfig::default();

        let outcomes =
            incremental_analyze(&dir, &[file], None, &config, StreamMode::Resilient);
        assert!(outcomes[0].result.is_err());
        assert!(load_cache(&dir, &config).unwrap().units.is_empty());

        fs::remove_dir_all(&dir).ok();
    }
}
