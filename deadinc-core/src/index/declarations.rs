//! Declaration records keyed by symbol name.
//!
//! Three buckets, each `name -> [FileId]` in insertion order. Duplicates are
//! kept: a name redeclared in two headers credits both, and a name forward
//! declared twice in one header credits it twice.

use std::collections::HashMap;

use tracing::debug;

use crate::events::{Bucket, DeclarationKind};
use crate::file_id::FileId;

/// Per-bucket sizes, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub general_names: usize,
    pub extern_names: usize,
    pub tag_names: usize,
    pub records: usize,
}

/// Declaration tables of one translation unit.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    general: HashMap<String, Vec<FileId>>,
    externs: HashMap<String, Vec<FileId>>,
    tags: HashMap<String, Vec<FileId>>,
    records: usize,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, bucket: Bucket) -> &HashMap<String, Vec<FileId>> {
        match bucket {
            Bucket::General => &self.general,
            Bucket::Extern => &self.externs,
            Bucket::Tag => &self.tags,
        }
    }

    fn table_mut(&mut self, bucket: Bucket) -> &mut HashMap<String, Vec<FileId>> {
        match bucket {
            Bucket::General => &mut self.general,
            Bucket::Extern => &mut self.externs,
            Bucket::Tag => &mut self.tags,
        }
    }

    /// Append `file` to the list for `name` in `bucket`.
    pub fn record(&mut self, bucket: Bucket, name: &str, file: FileId) {
        self.table_mut(bucket)
            .entry(name.to_string())
            .or_default()
            .push(file);
        self.records += 1;
    }

    /// Record a declaration in every bucket its kind selects.
    pub fn record_declaration(
        &mut self,
        kind: DeclarationKind,
        name: &str,
        file: &FileId,
        external_storage: bool,
    ) {
        for &bucket in kind.buckets(external_storage) {
            debug!(
                bucket = bucket.as_str(),
                kind = ?kind,
                name = %name,
                file = %file,
                "declaration"
            );
            self.record(bucket, name, file.clone());
        }
    }

    /// Files declaring `name` in `bucket`; empty when unknown.
    pub fn lookup(&self, bucket: Bucket, name: &str) -> &[FileId] {
        self.table(bucket)
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, bucket: Bucket, name: &str) -> bool {
        self.table(bucket).contains_key(name)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            general_names: self.general.len(),
            extern_names: self.externs.len(),
            tag_names: self.tags.len(),
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_missing_is_empty() {
        let index = DeclarationIndex::new();
        assert!(index.lookup(Bucket::General, "nope").is_empty());
    }

    #[test]
    fn test_duplicates_retained_in_order() {
        let mut index = DeclarationIndex::new();
        index.record(Bucket::General, "helper", FileId::new("a.h"));
        index.record(Bucket::General, "helper", FileId::new("b.h"));
        index.record(Bucket::General, "helper", FileId::new("a.h"));

        assert_eq!(
            index.lookup(Bucket::General, "helper"),
            &[FileId::new("a.h"), FileId::new("b.h"), FileId::new("a.h")]
        );
    }

    #[test]
    fn test_function_lands_in_general_and_extern() {
        let mut index = DeclarationIndex::new();
        index.record_declaration(DeclarationKind::Function, "run", &FileId::new("run.h"), false);

        assert_eq!(index.lookup(Bucket::General, "run"), &[FileId::new("run.h")]);
        assert_eq!(index.lookup(Bucket::Extern, "run"), &[FileId::new("run.h")]);
        assert!(!index.contains(Bucket::Tag, "run"));
    }

    #[test]
    fn test_plain_variable_not_extern() {
        let mut index = DeclarationIndex::new();
        index.record_declaration(DeclarationKind::Variable, "count", &FileId::new("c.h"), false);
        index.record_declaration(DeclarationKind::Variable, "total", &FileId::new("c.h"), true);

        assert!(!index.contains(Bucket::Extern, "count"));
        assert!(index.contains(Bucket::Extern, "total"));
    }

    #[test]
    fn test_typedef_only_tag_bucket() {
        let mut index = DeclarationIndex::new();
        index.record_declaration(DeclarationKind::Typedef, "buf_t", &FileId::new("buf.h"), false);

        assert!(index.contains(Bucket::Tag, "buf_t"));
        assert!(!index.contains(Bucket::General, "buf_t"));
    }

    #[test]
    fn test_stats() {
        let mut index = DeclarationIndex::new();
        index.record_declaration(DeclarationKind::Function, "f", &FileId::new("f.h"), false);
        index.record_declaration(DeclarationKind::Tag, "struct s", &FileId::new("s.h"), false);

        let stats = index.stats();
        assert_eq!(stats.general_names, 1);
        assert_eq!(stats.extern_names, 1);
        assert_eq!(stats.tag_names, 1);
        assert_eq!(stats.records, 3);
    }
}
