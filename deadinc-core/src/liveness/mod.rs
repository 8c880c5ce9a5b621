//! Include liveness: which `#include` directives of a unit are needed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │   annotation.rs     │     │    includes.rs      │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  include:allowed /  │────▶│  filter + tracked   │
//! │  include:optional   │     │  records, in order  │
//! └─────────────────────┘     └──────────┬──────────┘
//!                                        ▼
//!                             ┌─────────────────────┐
//!                             │     engine.rs       │
//!                             │  ─────────────────  │
//!                             │  seed, cross-match, │
//!                             │  propagate, judge   │
//!                             └─────────────────────┘
//! ```

pub mod annotation;
pub mod engine;
pub mod includes;

pub use annotation::{
    parse_include_line, IncludeAnnotation, IncludeLine, ALLOWED_MARKER, OPTIONAL_MARKER,
};
pub use engine::{FileVerdict, LivenessEngine, Verdict};
pub use includes::{IncludeFilter, IncludeRecord, IncludeTable, TrackOutcome};
