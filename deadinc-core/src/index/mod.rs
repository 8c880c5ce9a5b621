//! Declaration and usage tables for one translation unit.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │  declarations.rs    │     │     usages.rs       │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  name -> [FileId]   │     │  names used in the  │
//! │  per bucket         │     │  main file          │
//! └──────────┬──────────┘     └──────────┬──────────┘
//!            │                           │
//!            └───────────┬───────────────┘
//!                        ▼
//!            ┌─────────────────────┐
//!            │  liveness::engine   │
//!            │  ─────────────────  │
//!            │  credit declaring   │
//!            │  files per match    │
//!            └─────────────────────┘
//! ```
//!
//! Both sides are filled incrementally while the front end walks the unit;
//! event order does not matter.

pub mod declarations;
pub mod usages;

pub use declarations::{DeclarationIndex, IndexStats};
pub use usages::UsageAccumulator;
