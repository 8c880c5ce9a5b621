//! The finalization pass: credit include records, then judge them.
//!
//! Steps, in order:
//! 1. seed the main file's own headers (`x.c` -> `x.h`, `x_api.h`)
//! 2. cross-match each usage set against its declaration bucket, and credit
//!    macro definition files
//! 3. propagate use of `foo_private.h` to `foo_api.h`, one hop
//! 4. turn counts and annotations into verdicts
//!
//! Performance characteristics:
//! - Cross-matching: O(|U| * d) where U = used names, d = declarations per name
//! - Verdicts: O(|I|) single pass over tracked includes

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::includes::{IncludeRecord, IncludeTable};
use crate::config::AnalyzerConfig;
use crate::events::{Bucket, SourceLocation};
use crate::file_id::FileId;
use crate::index::{DeclarationIndex, UsageAccumulator};

/// Final judgement on one tracked include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Used (or optional) and not annotated.
    Live,
    /// Unused, not optional, not allowed.
    Dead,
    /// Unused, but annotated as allowed.
    Allowed,
    /// Annotated as allowed although it is used.
    RedundantlyAllowed,
}

impl Verdict {
    /// Derive the verdict from a record's final count and annotations.
    pub fn of(record: &IncludeRecord) -> Self {
        let live = record.usage_count > 0 || record.optional;
        match (live, record.allowed) {
            (true, false) => Verdict::Live,
            (true, true) => Verdict::RedundantlyAllowed,
            (false, true) => Verdict::Allowed,
            (false, false) => Verdict::Dead,
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, Verdict::Live | Verdict::RedundantlyAllowed)
    }
}

/// Verdict for one tracked include, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVerdict {
    pub file: FileId,
    pub location: SourceLocation,
    pub usage_count: u32,
    pub allowed: bool,
    pub optional: bool,
    pub verdict: Verdict,
}

impl From<&IncludeRecord> for FileVerdict {
    fn from(record: &IncludeRecord) -> Self {
        Self {
            file: record.file.clone(),
            location: record.location.clone(),
            usage_count: record.usage_count,
            allowed: record.allowed,
            optional: record.optional,
            verdict: Verdict::of(record),
        }
    }
}

/// Borrowed inputs of the liveness pass for one unit.
pub struct LivenessEngine<'a> {
    config: &'a AnalyzerConfig,
    main_file: &'a FileId,
    declarations: &'a DeclarationIndex,
    usages: &'a UsageAccumulator,
}

impl<'a> LivenessEngine<'a> {
    pub fn new(
        config: &'a AnalyzerConfig,
        main_file: &'a FileId,
        declarations: &'a DeclarationIndex,
        usages: &'a UsageAccumulator,
    ) -> Self {
        Self {
            config,
            main_file,
            declarations,
            usages,
        }
    }

    /// Headers named after the main file: `<stem><suffix>` for each self-header suffix.
    pub fn self_headers(&self) -> Vec<FileId> {
        let Some(stem) = self
            .config
            .source_suffixes
            .iter()
            .find_map(|suffix| self.main_file.strip_suffix(suffix))
        else {
            return Vec::new();
        };

        self.config
            .self_header_suffixes
            .iter()
            .map(|suffix| FileId::new(format!("{}{}", stem, suffix)))
            .collect()
    }

    fn seed_self_headers(&self, includes: &mut IncludeTable) {
        for header in self.self_headers() {
            if includes.seed(&header) {
                debug!(file = %header, "own header marked used");
            }
        }
    }

    fn cross_match(&self, includes: &mut IncludeTable) {
        for bucket in Bucket::ALL {
            for name in self.usages.names(bucket) {
                for file in self.declarations.lookup(bucket, name) {
                    if includes.credit(file, 1) {
                        debug!(bucket = bucket.as_str(), name = %name, file = %file, "matched");
                    }
                }
            }
        }

        for (file, count) in self.usages.macro_uses() {
            includes.credit(file, count);
        }
    }

    /// Single hop: siblings are collected before any of them is credited.
    fn propagate_private(&self, includes: &mut IncludeTable) {
        let siblings: Vec<FileId> = includes
            .iter()
            .filter(|record| record.usage_count > 0)
            .filter_map(|record| {
                record
                    .file
                    .replace_suffix(&self.config.private_suffix, &self.config.public_suffix)
            })
            .collect();

        for sibling in siblings {
            if includes.credit(&sibling, 1) {
                debug!(file = %sibling, "public header used through its private header");
            }
        }
    }

    /// Run all steps over `includes` and return verdicts in directive order.
    pub fn run(&self, includes: &mut IncludeTable) -> Vec<FileVerdict> {
        self.seed_self_headers(includes);
        self.cross_match(includes);
        self.propagate_private(includes);

        includes
            .iter()
            .map(|record| {
                debug!(file = %record.file, count = record.usage_count, "final count");
                FileVerdict::from(record)
            })
            .collect()
    }
}
