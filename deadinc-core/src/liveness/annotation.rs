//! Inline include annotations.
//!
//! An include can be marked by a comment placed right after its filename
//! token:
//!
//! ```c
//! #include "legacy.h" /* include:allowed */
//! #include "opt.h" /* include:optional */
//! ```
//!
//! The marker must start at the token end, single leading space included.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Literal text marking an include as intentionally kept.
pub const ALLOWED_MARKER: &str = " /* include:allowed */";

/// Literal text excluding an include from the unused check.
pub const OPTIONAL_MARKER: &str = " /* include:optional */";

/// Annotations found on one include directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeAnnotation {
    pub allowed: bool,
    pub optional: bool,
}

impl IncludeAnnotation {
    /// Read annotations from the text following the filename token.
    pub fn from_trailing_text(text: &str) -> Self {
        Self {
            allowed: text.starts_with(ALLOWED_MARKER),
            optional: text.starts_with(OPTIONAL_MARKER),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.allowed && !self.optional
    }
}

/// An `#include` line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeLine {
    /// Target as spelled between the quotes or angle brackets.
    pub target: String,
    pub angled: bool,
    /// Everything after the closing `"` or `>`.
    pub trailing: String,
}

impl IncludeLine {
    pub fn annotation(&self) -> IncludeAnnotation {
        IncludeAnnotation::from_trailing_text(&self.trailing)
    }
}

fn include_line_regex() -> Option<&'static Regex> {
    static INCLUDE_LINE: OnceLock<Option<Regex>> = OnceLock::new();
    INCLUDE_LINE
        .get_or_init(|| Regex::new(r#"^\s*#\s*include\s*(?:"([^"]+)"|<([^>]+)>)(.*)$"#).ok())
        .as_ref()
}

/// Split a raw source line into an [`IncludeLine`].
///
/// Returns `None` for anything that is not a quoted or angled `#include`
/// (computed includes, `#import`, ordinary code).
pub fn parse_include_line(line: &str) -> Option<IncludeLine> {
    let caps = include_line_regex()?.captures(line.trim_end_matches(['\r', '\n']))?;
    let (target, angled) = match (caps.get(1), caps.get(2)) {
        (Some(quoted), _) => (quoted.as_str(), false),
        (None, Some(angled)) => (angled.as_str(), true),
        (None, None) => return None,
    };
    let trailing = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

    Some(IncludeLine {
        target: target.to_string(),
        angled,
        trailing: trailing.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_marker() {
        let a = IncludeAnnotation::from_trailing_text(" /* include:allowed */");
        assert!(a.allowed);
        assert!(!a.optional);
    }

    #[test]
    fn test_optional_marker_with_more_text_after() {
        let a = IncludeAnnotation::from_trailing_text(" /* include:optional */ // keep");
        assert!(a.optional);
        assert!(!a.allowed);
    }

    #[test]
    fn test_marker_must_start_at_token_end() {
        assert!(IncludeAnnotation::from_trailing_text("  /* include:allowed */").is_empty());
        assert!(IncludeAnnotation::from_trailing_text("/* include:allowed */").is_empty());
        assert!(IncludeAnnotation::from_trailing_text(" // include:allowed").is_empty());
        assert!(IncludeAnnotation::from_trailing_text("").is_empty());
    }

    #[test]
    fn test_parse_quoted_include() {
        let line = parse_include_line("#include \"legacy.h\" /* include:allowed */").unwrap();
        assert_eq!(line.target, "legacy.h");
        assert!(!line.angled);
        assert!(line.annotation().allowed);
    }

    #[test]
    fn test_parse_angled_include_with_spacing() {
        let line = parse_include_line("  #  include <stdio.h>\r\n").unwrap();
        assert_eq!(line.target, "stdio.h");
        assert!(line.angled);
        assert_eq!(line.trailing, "");
    }

    #[test]
    fn test_parse_rejects_non_includes() {
        assert!(parse_include_line("int main(void) { return 0; }").is_none());
        assert!(parse_include_line("#include MACRO_HEADER").is_none());
        assert!(parse_include_line("#import \"x.h\"").is_none());
    }
}
