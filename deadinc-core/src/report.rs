//! Output formatting - plaintext and JSON.

use std::io::{self, Write};

use serde_json::json;

use crate::builder::AnalysisResult;
use crate::diagnostics::DiagnosticKind;

/// Writes one compiler-style line per diagnostic, then a summary.
pub fn write_plain<W: Write>(out: &mut W, result: &AnalysisResult) -> io::Result<()> {
    for diagnostic in result.diagnostics() {
        writeln!(out, "{}", diagnostic)?;
    }
    for failure in &result.failures {
        writeln!(out, "{}: skipped: {}", failure.source.display(), failure.message)?;
    }

    let total = result.diagnostic_count();
    if total == 0 {
        writeln!(
            out,
            "No unused includes found ({} units, {} tracked includes).",
            result.units.len(),
            result.tracked_includes()
        )
    } else {
        writeln!(
            out,
            "{} diagnostics ({} unused, {} redundant allowed) in {} units.",
            total,
            result.count_of(DiagnosticKind::UnusedInclude),
            result.count_of(DiagnosticKind::RedundantAllowedAnnotation),
            result.units.len()
        )
    }
}

/// Prints diagnostics in plain text format.
pub fn print_plain(result: &AnalysisResult) {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    if let Err(e) = write_plain(&mut lock, result) {
        eprintln!("[WARN] failed to write report: {}", e);
    }
}

/// Builds the JSON document for `result`.
pub fn to_json(result: &AnalysisResult) -> serde_json::Value {
    let diagnostics: Vec<_> = result
        .diagnostics()
        .map(|d| {
            json!({
                "file": d.location.file,
                "line": d.location.line,
                "column": d.location.column,
                "severity": d.severity,
                "kind": d.kind,
                "include": d.file,
                "message": d.message(),
            })
        })
        .collect();

    json!({
        "diagnostics": diagnostics,
        "units": result.units,
        "failures": result.failures,
        "summary": {
            "units": result.units.len(),
            "tracked_includes": result.tracked_includes(),
            "unused": result.count_of(DiagnosticKind::UnusedInclude),
            "redundant_allowed": result.count_of(DiagnosticKind::RedundantAllowedAnnotation),
            "cache_hits": result.cache_hits,
        },
    })
}

/// Prints diagnostics in JSON format.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(&to_json(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"diagnostics\": {}}}", result.diagnostic_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisState;
    use crate::config::AnalyzerConfig;
    use crate::events::SourceLocation;
    use crate::file_id::FileId;
    use crate::liveness::IncludeAnnotation;
    use std::path::PathBuf;

    fn sample_result() -> AnalysisResult {
        let mut state = AnalysisState::new("src/main.c", AnalyzerConfig::default());
        state.on_include_directive(
            &FileId::new("src/dead.h"),
            SourceLocation::new("src/main.c", 3, 1),
            false,
            true,
            IncludeAnnotation::default(),
        );
        AnalysisResult {
            root: PathBuf::from("events"),
            units: vec![state.into_report()],
            failures: Vec::new(),
            cache_hits: 0,
        }
    }

    #[test]
    fn test_plain_lines() {
        let mut out = Vec::new();
        write_plain(&mut out, &sample_result()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("src/main.c:3:1: warning: unused #include of 'src/dead.h'")
        );
        assert!(lines.next().unwrap().starts_with("1 diagnostics (1 unused"));
    }

    #[test]
    fn test_plain_empty_summary() {
        let result = AnalysisResult {
            root: PathBuf::from("events"),
            units: Vec::new(),
            failures: Vec::new(),
            cache_hits: 0,
        };
        let mut out = Vec::new();
        write_plain(&mut out, &result).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No unused includes found"));
    }

    #[test]
    fn test_json_shape() {
        let value = to_json(&sample_result());
        assert_eq!(value["diagnostics"][0]["kind"], "unused_include");
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
        assert_eq!(value["diagnostics"][0]["include"], "src/dead.h");
        assert_eq!(value["summary"]["unused"], 1);
    }
}
