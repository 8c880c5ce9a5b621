//! Names the main file uses, one set per usage domain.
//!
//! Whoever feeds this must already have dropped events located outside the
//! main file; usages inside headers never credit anything.
//!
//! Macro expansions have no declaration record, so they are kept apart as
//! per-file counts and credit the defining file directly.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::events::{Bucket, UsageKind};
use crate::file_id::FileId;

/// Usage sets of one translation unit.
#[derive(Debug, Clone, Default)]
pub struct UsageAccumulator {
    references: HashSet<String>,
    definitions: HashSet<String>,
    tag_usages: HashSet<String>,
    macro_uses: HashMap<FileId, u32>,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_reference(&mut self, name: &str) {
        debug!(name = %name, "usage");
        self.references.insert(name.to_string());
    }

    pub fn note_definition(&mut self, name: &str) {
        debug!(name = %name, "definition");
        self.definitions.insert(name.to_string());
    }

    pub fn note_tag_usage(&mut self, name: &str) {
        debug!(name = %name, "type usage");
        self.tag_usages.insert(name.to_string());
    }

    /// Count one expansion of a macro defined in `definition_file`.
    pub fn note_macro_use(&mut self, definition_file: &FileId) {
        debug!(file = %definition_file, "macro usage");
        *self.macro_uses.entry(definition_file.clone()).or_insert(0) += 1;
    }

    /// Expansion counts per defining file.
    pub fn macro_uses(&self) -> impl Iterator<Item = (&FileId, u32)> {
        self.macro_uses.iter().map(|(file, count)| (file, *count))
    }

    /// Dispatch a usage event to its set.
    pub fn note(&mut self, kind: UsageKind, name: &str) {
        match kind {
            UsageKind::Reference => self.note_reference(name),
            UsageKind::Definition => self.note_definition(name),
            UsageKind::MemberAccess | UsageKind::TagUsage => self.note_tag_usage(name),
        }
    }

    /// The usage set matched against `bucket`.
    pub fn names(&self, bucket: Bucket) -> &HashSet<String> {
        match bucket {
            Bucket::General => &self.references,
            Bucket::Extern => &self.definitions,
            Bucket::Tag => &self.tag_usages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
            && self.definitions.is_empty()
            && self.tag_usages.is_empty()
            && self.macro_uses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut usages = UsageAccumulator::new();
        usages.note_reference("helper");
        usages.note_reference("helper");
        assert_eq!(usages.names(Bucket::General).len(), 1);
    }

    #[test]
    fn test_kinds_route_to_sets() {
        let mut usages = UsageAccumulator::new();
        usages.note(UsageKind::Reference, "helper");
        usages.note(UsageKind::Definition, "global_count");
        usages.note(UsageKind::TagUsage, "struct point");
        usages.note(UsageKind::MemberAccess, "struct rect");

        assert!(usages.names(Bucket::General).contains("helper"));
        assert!(usages.names(Bucket::Extern).contains("global_count"));
        let tags = usages.names(Bucket::Tag);
        assert!(tags.contains("struct point"));
        assert!(tags.contains("struct rect"));
        assert!(!usages.is_empty());
    }

    #[test]
    fn test_macro_uses_counted_per_file() {
        let mut usages = UsageAccumulator::new();
        usages.note_macro_use(&FileId::new("config.h"));
        usages.note_macro_use(&FileId::new("./config.h"));
        usages.note_macro_use(&FileId::new("log.h"));

        let mut counts: Vec<_> = usages
            .macro_uses()
            .map(|(file, count)| (file.as_str().to_string(), count))
            .collect();
        counts.sort();
        assert_eq!(counts, vec![("config.h".to_string(), 2), ("log.h".to_string(), 1)]);
    }

    #[test]
    fn test_same_name_independent_across_domains() {
        let mut usages = UsageAccumulator::new();
        usages.note_reference("node");
        assert!(!usages.names(Bucket::Tag).contains("node"));
        assert!(!usages.names(Bucket::Extern).contains("node"));
    }
}
