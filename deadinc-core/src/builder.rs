//! Builder pattern API for batch include analysis.
//!
//! Provides a fluent interface for analyzing every recorded translation unit
//! under a directory:
//!
//! ```rust,ignore
//! use deadinc_core::prelude::*;
//!
//! let result = Deadinc::new("/path/to/build/events")
//!     .warnings_as_errors(true)
//!     .with_cache(true)
//!     .ignore_patterns(["generated/"])
//!     .analyze()?;
//!
//! println!("Unused includes: {}", result.diagnostic_count());
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::analyzer::UnitReport;
use crate::config::AnalyzerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::DeadincError;
use crate::scan::gather_event_files_with_excludes;
use crate::stream::{analyze_event_file, StreamMode};

/// Builder for configuring a batch analysis.
#[derive(Debug, Clone)]
pub struct Deadinc {
    /// Directory holding `*.events.jsonl` streams, or one stream file
    root: PathBuf,

    /// Analyzer conventions and filters
    config: AnalyzerConfig,

    /// Whether to use incremental caching
    use_cache: bool,

    /// Abort on the first malformed stream instead of skipping it
    strict: bool,

    /// Custom excluded directories
    excluded_dirs: Vec<String>,

    /// Diagnostics for files matching these are dropped
    ignored_patterns: Vec<String>,
}

impl Deadinc {
    /// Create a new analysis builder for the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: AnalyzerConfig::default(),
            use_cache: cfg!(feature = "cache"),
            strict: false,
            excluded_dirs: Vec::new(),
            ignored_patterns: Vec::new(),
        }
    }

    /// Replace the analyzer configuration.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Report every diagnostic as an error.
    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.config.warnings_as_errors = enabled;
        self
    }

    /// Enable or disable incremental caching.
    ///
    /// Has no effect without the `cache` feature.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Fail the whole run on the first malformed stream.
    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add patterns for included files whose diagnostics are dropped.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn stream_mode(&self) -> StreamMode {
        if self.strict {
            StreamMode::Strict
        } else {
            StreamMode::Resilient
        }
    }

    /// Run the analysis and return results.
    ///
    /// A missing root is an [`DeadincError::InvalidArgument`]. A stream that
    /// fails with a recoverable error is recorded in
    /// [`AnalysisResult::failures`] unless the builder is strict.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        if !self.root.exists() {
            return Err(DeadincError::invalid_argument(format!(
                "analysis root does not exist: {}",
                self.root.display()
            ))
            .into());
        }

        // 1. Gather streams
        let excludes: Vec<&str> = self.excluded_dirs.iter().map(String::as_str).collect();
        let files = gather_event_files_with_excludes(&self.root, &excludes)
            .context("Failed to gather event files")?;

        // 2. Analyze each unit, reusing cached reports when enabled
        let outcomes = self.run_units(&files);

        // 3. Split successes from failures
        let mut units = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        let mut cache_hits = 0;
        for outcome in outcomes {
            match outcome.result {
                Ok(mut report) => {
                    if outcome.from_cache {
                        cache_hits += 1;
                    }
                    report.diagnostics.retain(|d| !self.is_ignored(d));
                    units.push(report);
                }
                Err(e) if self.strict || !e.is_recoverable() => {
                    bail!("Failed to analyze {}: {}", outcome.source.display(), e);
                }
                Err(e) => failures.push(UnitFailure {
                    source: outcome.source,
                    message: e.to_string(),
                }),
            }
        }

        // 4. Deterministic order regardless of scheduling
        units.sort_by(|a, b| a.main_file.cmp(&b.main_file));

        Ok(AnalysisResult {
            root: self.root.clone(),
            units,
            failures,
            cache_hits,
        })
    }

    #[cfg(feature = "cache")]
    fn run_units(&self, files: &[PathBuf]) -> Vec<UnitOutcome> {
        if !self.use_cache {
            return self.run_uncached(files);
        }
        let cache_root = self.cache_root();
        let cached = crate::cache::load_cache(&cache_root, &self.config);
        crate::cache::incremental_analyze(
            &cache_root,
            files,
            cached,
            &self.config,
            self.stream_mode(),
        )
    }

    #[cfg(not(feature = "cache"))]
    fn run_units(&self, files: &[PathBuf]) -> Vec<UnitOutcome> {
        self.run_uncached(files)
    }

    fn run_uncached(&self, files: &[PathBuf]) -> Vec<UnitOutcome> {
        let mode = self.stream_mode();
        files
            .par_iter()
            .map(|file| match analyze_event_file(file, &self.config, mode) {
                Ok(report) => UnitOutcome::analyzed(file, report, false),
                Err(e) => UnitOutcome::failed(file, e),
            })
            .collect()
    }

    /// The cache lives next to the streams, even when `root` names a single file.
    #[cfg(feature = "cache")]
    fn cache_root(&self) -> PathBuf {
        if self.root.is_file() {
            self.root
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            self.root.clone()
        }
    }

    /// Check if a diagnostic's included file matches any ignored pattern.
    fn is_ignored(&self, diagnostic: &Diagnostic) -> bool {
        let name = diagnostic.file.as_str();
        self.ignored_patterns.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                name.starts_with(prefix)
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name.contains(pattern.as_str())
            }
        })
    }
}

/// Result of analyzing one stream file.
#[derive(Debug)]
pub struct UnitOutcome {
    pub source: PathBuf,
    pub result: Result<UnitReport, DeadincError>,
    pub from_cache: bool,
}

impl UnitOutcome {
    pub fn analyzed(source: &Path, report: UnitReport, from_cache: bool) -> Self {
        Self {
            source: source.to_path_buf(),
            result: Ok(report),
            from_cache,
        }
    }

    pub fn failed(source: &Path, error: DeadincError) -> Self {
        Self {
            source: source.to_path_buf(),
            result: Err(error),
            from_cache: false,
        }
    }

    pub fn report(&self) -> Option<&UnitReport> {
        self.result.as_ref().ok()
    }
}

/// A stream that could not be analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Result of running a batch analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Root path that was analyzed
    pub root: PathBuf,

    /// One report per stream, sorted by main file
    pub units: Vec<UnitReport>,

    /// Streams skipped because they were malformed or unreadable
    pub failures: Vec<UnitFailure>,

    /// Units served from the cache
    pub cache_hits: usize,
}

impl AnalysisResult {
    /// All diagnostics, unit by unit.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.units.iter().flat_map(|u| u.diagnostics.iter())
    }

    pub fn diagnostic_count(&self) -> usize {
        self.units.iter().map(|u| u.diagnostics.len()).sum()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics().filter(|d| d.kind == kind).count()
    }

    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.units.iter().any(UnitReport::has_errors)
    }

    /// Number of includes tracked across all units.
    pub fn tracked_includes(&self) -> usize {
        self.units.iter().map(|u| u.stats.tracked_includes).sum()
    }
}
