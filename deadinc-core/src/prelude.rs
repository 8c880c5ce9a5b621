//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use deadinc_core::prelude::*;
//! ```
//!
//! This provides the types a host needs to drive one translation unit or a
//! batch of recorded ones.

// Core analysis types
pub use crate::analyzer::{AnalysisState, UnitReport};
pub use crate::error::{DeadincError, DeadincResult};
pub use crate::events::{DeclarationKind, Event, SourceLocation, UsageKind};
pub use crate::file_id::FileId;

// Diagnostics
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity};
pub use crate::liveness::{IncludeAnnotation, TrackOutcome, Verdict};

// Configuration
pub use crate::config::{load_config, AnalyzerConfig, DeadincConfig};

// Event streams
pub use crate::stream::{analyze_event_file, analyze_events, StreamMode};

// Builder API
pub use crate::builder::{AnalysisResult, Deadinc};

// Caching
#[cfg(feature = "cache")]
pub use crate::cache::{load_cache, save_cache, DeadincCache};
