//! Tracked include directives of the main file.
//!
//! Only directives that resolve to a header outside the system prefixes are
//! tracked. Records keep insertion order so diagnostics come out in source
//! order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::annotation::IncludeAnnotation;
use crate::config::AnalyzerConfig;
use crate::events::SourceLocation;
use crate::file_id::FileId;

/// One tracked include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeRecord {
    pub file: FileId,
    /// Location of the `#` of the directive.
    pub location: SourceLocation,
    pub usage_count: u32,
    pub allowed: bool,
    pub optional: bool,
}

/// Why an include directive did not produce a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Tracked,
    /// The file was already included earlier; the first directive wins.
    Duplicate,
    Unresolved,
    /// The unit is skipped or already finalized.
    Inactive,
    SystemHeader,
    NotAHeader,
}

/// Decides which include targets are worth tracking.
#[derive(Debug, Clone)]
pub struct IncludeFilter {
    system_prefixes: Vec<String>,
    header_suffixes: Vec<String>,
}

impl IncludeFilter {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            system_prefixes: config.system_prefixes.clone(),
            header_suffixes: config.header_suffixes.clone(),
        }
    }

    /// `Tracked` when the file passes both checks, otherwise the reason it does not.
    pub fn classify(&self, file: &FileId) -> TrackOutcome {
        if self.system_prefixes.iter().any(|p| file.starts_with(p)) {
            return TrackOutcome::SystemHeader;
        }
        if !self.header_suffixes.iter().any(|s| file.ends_with(s)) {
            return TrackOutcome::NotAHeader;
        }
        TrackOutcome::Tracked
    }
}

/// Include records in directive order, indexed by file.
#[derive(Debug, Clone, Default)]
pub struct IncludeTable {
    records: Vec<IncludeRecord>,
    by_file: HashMap<FileId, usize>,
}

impl IncludeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `file`. The caller has already applied the filter.
    ///
    /// Returns `false` if the file is tracked already.
    pub fn insert(
        &mut self,
        file: FileId,
        location: SourceLocation,
        annotation: IncludeAnnotation,
    ) -> bool {
        if self.by_file.contains_key(&file) {
            return false;
        }
        self.by_file.insert(file.clone(), self.records.len());
        self.records.push(IncludeRecord {
            file,
            location,
            usage_count: 0,
            allowed: annotation.allowed,
            optional: annotation.optional,
        });
        true
    }

    pub fn contains(&self, file: &FileId) -> bool {
        self.by_file.contains_key(file)
    }

    pub fn get(&self, file: &FileId) -> Option<&IncludeRecord> {
        self.by_file.get(file).map(|&i| &self.records[i])
    }

    /// Add `amount` to a tracked file's count. Untracked files are ignored.
    pub fn credit(&mut self, file: &FileId, amount: u32) -> bool {
        match self.by_file.get(file) {
            Some(&i) => {
                let record = &mut self.records[i];
                record.usage_count = record.usage_count.saturating_add(amount);
                debug!(file = %file, count = record.usage_count, "found usage");
                true
            }
            None => false,
        }
    }

    /// Raise a tracked file's count to at least one.
    pub fn seed(&mut self, file: &FileId) -> bool {
        match self.by_file.get(file) {
            Some(&i) => {
                let record = &mut self.records[i];
                record.usage_count = record.usage_count.max(1);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncludeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation::new("main.c", line, 1)
    }

    #[test]
    fn test_filter_system_prefix() {
        let filter = IncludeFilter::new(&AnalyzerConfig::default());
        assert_eq!(
            filter.classify(&FileId::new("/usr/include/stdio.h")),
            TrackOutcome::SystemHeader
        );
        assert_eq!(
            filter.classify(&FileId::new("include/util.h")),
            TrackOutcome::Tracked
        );
    }

    #[test]
    fn test_filter_requires_header_suffix() {
        let filter = IncludeFilter::new(&AnalyzerConfig::default());
        assert_eq!(filter.classify(&FileId::new("table.inc")), TrackOutcome::NotAHeader);
        assert_eq!(filter.classify(&FileId::new("gen.c")), TrackOutcome::NotAHeader);
    }

    #[test]
    fn test_filter_sees_canonical_path() {
        let filter = IncludeFilter::new(&AnalyzerConfig::default());
        assert_eq!(
            filter.classify(&FileId::new("/opt/../usr/include/x.h")),
            TrackOutcome::SystemHeader
        );
    }

    #[test]
    fn test_first_directive_wins() {
        let mut table = IncludeTable::new();
        let allowed = IncludeAnnotation {
            allowed: true,
            optional: false,
        };
        assert!(table.insert(FileId::new("a.h"), loc(1), allowed));
        assert!(!table.insert(FileId::new("./a.h"), loc(9), IncludeAnnotation::default()));

        let record = table.get(&FileId::new("a.h")).unwrap();
        assert_eq!(record.location.line, 1);
        assert!(record.allowed);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_credit_only_tracked() {
        let mut table = IncludeTable::new();
        table.insert(FileId::new("a.h"), loc(1), IncludeAnnotation::default());

        assert!(table.credit(&FileId::new("a.h"), 2));
        assert!(!table.credit(&FileId::new("b.h"), 1));
        assert_eq!(table.get(&FileId::new("a.h")).unwrap().usage_count, 2);
    }

    #[test]
    fn test_seed_does_not_lower_count() {
        let mut table = IncludeTable::new();
        table.insert(FileId::new("a.h"), loc(1), IncludeAnnotation::default());
        table.credit(&FileId::new("a.h"), 3);
        table.seed(&FileId::new("a.h"));
        assert_eq!(table.get(&FileId::new("a.h")).unwrap().usage_count, 3);
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let mut table = IncludeTable::new();
        for (i, name) in ["z.h", "a.h", "m.h"].iter().enumerate() {
            table.insert(FileId::new(name), loc(i as u32 + 1), IncludeAnnotation::default());
        }
        let order: Vec<_> = table.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(order, vec!["z.h", "a.h", "m.h"]);
    }
}
