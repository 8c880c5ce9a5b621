//! deadinc-core: include liveness analysis for C translation units
//!
//! Finds `#include` directives in a translation unit's main file that
//! contribute nothing the main file uses, and `/* include:allowed */`
//! annotations that have become unnecessary.
//!
//! # Features
//!
//! - **Name-based liveness**: declarations outside the main file are matched
//!   against usages inside it, per namespace bucket
//! - **Macro credit**: a macro expansion keeps its defining header alive
//! - **Naming conventions**: a unit's own headers start out used, and a used
//!   `_private.h` header keeps its `_api.h` sibling alive
//! - **Annotations**: `include:allowed` and `include:optional` markers
//! - **Event streams**: replay front-end callbacks recorded as JSON Lines
//! - **Incremental caching**: only re-analyze changed streams
//!
//! # Quick Start
//!
//! Driving one unit directly from a front end:
//!
//! ```rust,ignore
//! use deadinc_core::prelude::*;
//!
//! let mut unit = AnalysisState::new("src/main.c", AnalyzerConfig::default());
//! unit.on_include_directive(
//!     &FileId::new("src/util.h"),
//!     SourceLocation::new("src/main.c", 1, 1),
//!     false,
//!     true,
//!     IncludeAnnotation::default(),
//! );
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! unit.on_end_of_translation_unit(&mut diagnostics);
//! ```
//!
//! Or a batch of recorded streams:
//!
//! ```rust,ignore
//! let result = Deadinc::new("build/events").analyze()?;
//! for d in result.diagnostics() {
//!     println!("{}", d);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`analyzer`]: Per-unit state and the end-of-unit hook
//! - [`index`]: Declaration index and usage accumulator
//! - [`liveness`]: Include table, annotations and the liveness pass
//! - [`diagnostics`]: Diagnostic kinds, severity and sinks
//! - [`stream`]: JSON Lines event replay
//! - [`scan`]: Parallel stream discovery
//! - [`cache`]: Incremental result cache with SHA-256 change detection
//! - [`builder`]: Fluent builder API for batch runs
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `cache` (default): Enable the incremental result cache
//! - `full`: Enable all optional features

// Core modules (always available)
pub mod analyzer;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod file_id;
pub mod index;
pub mod liveness;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod stream;

// Feature-gated modules
#[cfg(feature = "cache")]
pub mod cache;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadincError, DeadincResult, IoResultExt};

// Per-unit analysis
pub use analyzer::{AnalysisState, UnitReport, UnitStats};

// Builder API
pub use builder::{AnalysisResult, Deadinc, UnitFailure, UnitOutcome};

// Cache types
#[cfg(feature = "cache")]
pub use cache::{
    incremental_analyze, load_cache, save_cache, CacheMetadata, CachedUnit,
    DeadincCache,
};

// Configuration
pub use config::{load_config, load_config_file, AnalyzerConfig, DeadincConfig, OutputConfig};

// Diagnostics
pub use diagnostics::{diagnose, Diagnostic, DiagnosticKind, DiagnosticSink, Severity};

// Events and identities
pub use events::{Bucket, DeclarationKind, Event, SourceLocation, UsageKind};
pub use file_id::{canonicalize_path, normalize_path_string, FileId};

// Indexes
pub use index::{DeclarationIndex, IndexStats, UsageAccumulator};

// Liveness
pub use liveness::{
    parse_include_line, FileVerdict, IncludeAnnotation, IncludeFilter, IncludeLine,
    IncludeRecord, IncludeTable, LivenessEngine, TrackOutcome, Verdict, ALLOWED_MARKER,
    OPTIONAL_MARKER,
};

// Logging
pub use logging::{init_structured_logging, log_event, log_info, log_warn};

// Reporting
pub use report::{print_json, print_plain, to_json, write_plain};

// Stream discovery and replay
pub use scan::{gather_event_files, gather_event_files_with_excludes, EVENT_FILE_SUFFIX};
pub use stream::{analyze_event_file, analyze_events, apply_event, parse_event_line, StreamMode};
