//! Declaration and usage events produced by a C front end.
//!
//! The front end (AST walk, macro expansion tracking, include resolution)
//! is external. This module is the data contract between it and the
//! analyzer, plus the serialized [`Event`] form used in `.events.jsonl`
//! streams.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::file_id::FileId;

/// Which declaration table a record lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Functions, variables, enum constants: credited by references.
    General,
    /// Declarations a definition in the main file needs: credited by definitions.
    Extern,
    /// Types, typedefs, tags: credited by type usages.
    Tag,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::General, Bucket::Extern, Bucket::Tag];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::General => "general",
            Bucket::Extern => "extern",
            Bucket::Tag => "tag",
        }
    }
}

/// Kind of a declaration seen outside the main file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Variable,
    Type,
    Typedef,
    EnumConstant,
    Tag,
}

impl DeclarationKind {
    /// Buckets a declaration of this kind is recorded in.
    ///
    /// Every function is extern-eligible regardless of storage class: a
    /// `foo.c` may define what `foo_internal.h` declares while `foo.h` is
    /// the header it actually includes.
    pub fn buckets(self, external_storage: bool) -> &'static [Bucket] {
        match self {
            DeclarationKind::Typedef | DeclarationKind::Type | DeclarationKind::Tag => {
                &[Bucket::Tag]
            }
            DeclarationKind::Function => &[Bucket::General, Bucket::Extern],
            DeclarationKind::Variable if external_storage => &[Bucket::General, Bucket::Extern],
            DeclarationKind::Variable | DeclarationKind::EnumConstant => &[Bucket::General],
        }
    }
}

/// Kind of a usage observed in the main file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// A reference to a declared name (`helper()`, `counter += 1`).
    Reference,
    /// Access to a record field; the name is the owning record's type spelling.
    MemberAccess,
    /// A main-file definition of something declared elsewhere.
    Definition,
    /// Use of a type, tag or typedef name.
    TagUsage,
}

impl UsageKind {
    /// The declaration bucket this usage is matched against.
    pub fn bucket(self) -> Bucket {
        match self {
            UsageKind::Reference => Bucket::General,
            UsageKind::Definition => Bucket::Extern,
            UsageKind::MemberAccess | UsageKind::TagUsage => Bucket::Tag,
        }
    }
}

/// A position in a source file (1-indexed line and column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<FileId>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One line of a serialized event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Opens the stream: the translation unit's main file.
    MainFile { path: FileId },
    Declaration {
        kind: DeclarationKind,
        name: String,
        file: FileId,
        #[serde(default)]
        external_storage: bool,
    },
    Usage { kind: UsageKind, name: String },
    Include {
        file: FileId,
        line: u32,
        #[serde(default = "default_column")]
        column: u32,
        #[serde(default)]
        angled: bool,
        #[serde(default = "default_resolved")]
        resolved: bool,
        /// Source text directly after the filename token, if the front end has it.
        #[serde(default)]
        trailing: Option<String>,
    },
    MacroUse {
        definition_file: FileId,
        line: u32,
        #[serde(default = "default_column")]
        column: u32,
    },
    EndOfUnit,
}

fn default_column() -> u32 {
    1
}

fn default_resolved() -> bool {
    true
}
