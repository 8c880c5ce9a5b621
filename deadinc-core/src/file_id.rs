//! Canonical file identities.
//!
//! Usage credit is joined to include records by string key, so every path
//! that reaches the analyzer goes through [`canonicalize_path`] first. Two
//! spellings of the same file (`./a/../b.h`, `b.h`, `b\\x.h` on Windows) must
//! produce the identical [`FileId`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a path string to use forward slashes consistently.
#[inline]
pub fn normalize_path_string(path: &str) -> String {
    path.replace('\\', "/")
}

/// Canonicalize a path spelling without touching the filesystem.
///
/// - `.` segments and empty segments (`a//b`) are dropped
/// - `..` pops the previous segment; at the root of an absolute path it is dropped,
///   in a relative path with nothing left to pop it is kept
/// - a leading `/` is preserved
///
/// Total: every input, including the empty string, has a canonical form.
pub fn canonicalize_path(raw: &str) -> String {
    let normalized = normalize_path_string(raw);
    let absolute = normalized.starts_with('/');

    let mut parts: Vec<&str> = Vec::with_capacity(8);
    for part in normalized.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Canonicalized file path used as the join key between declarations,
/// macro definitions and include directives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FileId(String);

impl FileId {
    /// Canonicalize `path` into a file identity.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(canonicalize_path(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// The path with `suffix` removed, if it ends with it.
    pub fn strip_suffix(&self, suffix: &str) -> Option<&str> {
        self.0.strip_suffix(suffix)
    }

    /// Swap `old` for `new` at the end of the path.
    ///
    /// `foo_private.h` with (`_private.h`, `_api.h`) becomes `foo_api.h`.
    pub fn replace_suffix(&self, old: &str, new: &str) -> Option<FileId> {
        self.strip_suffix(old).map(|stem| FileId::new(format!("{}{}", stem, new)))
    }
}

impl From<String> for FileId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for FileId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<FileId> for String {
    fn from(id: FileId) -> Self {
        id.0
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
