//! JSON Lines event streams.
//!
//! A front end that cannot link against this crate writes one [`Event`] per
//! line; [`analyze_events`] replays the stream into an [`AnalysisState`].
//!
//! ```text
//! {"event":"main_file","path":"src/main.c"}
//! {"event":"include","file":"src/util.h","line":1}
//! {"event":"declaration","kind":"function","name":"helper","file":"src/util.h"}
//! {"event":"usage","kind":"reference","name":"helper"}
//! {"event":"end_of_unit"}
//! ```
//!
//! Blank lines and `//` comment lines are skipped. Streams without an
//! `end_of_unit` line are finalized at end of input.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::analyzer::{AnalysisState, UnitReport};
use crate::config::AnalyzerConfig;
use crate::error::{DeadincError, DeadincResult, IoResultExt};
use crate::events::{Event, SourceLocation};
use crate::liveness::IncludeAnnotation;

/// Whether malformed lines abort the unit or are skipped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    #[default]
    Resilient,
    Strict,
}

/// Decode one stream line. `None` for blank and comment lines.
pub fn parse_event_line(line: &str) -> Option<Result<Event, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }
    Some(serde_json::from_str(trimmed))
}

/// Feed one decoded event into `state`.
pub fn apply_event(state: &mut AnalysisState, event: Event) {
    match event {
        Event::MainFile { path } => {
            warn!(path = %path, main_file = %state.main_file(), "second main_file event ignored");
        }
        Event::Declaration {
            kind,
            name,
            file,
            external_storage,
        } => state.on_declaration(kind, &name, &file, external_storage),
        Event::Usage { kind, name } => state.on_usage(kind, &name),
        Event::Include {
            file,
            line,
            column,
            angled,
            resolved,
            trailing,
        } => {
            let location = SourceLocation::new(state.main_file().clone(), line, column);
            state.on_include_directive_with(&file, location, angled, resolved, |_| {
                trailing
                    .as_deref()
                    .map(IncludeAnnotation::from_trailing_text)
                    .unwrap_or_default()
            });
        }
        Event::MacroUse {
            definition_file,
            line,
            column,
        } => {
            let location = SourceLocation::new(state.main_file().clone(), line, column);
            state.on_macro_use(&definition_file, &location);
        }
        Event::EndOfUnit => {
            state.finalize();
        }
    }
}

/// Analyze the events in `content`. `path` is only used for error messages.
pub fn analyze_events(
    path: &Path,
    content: &str,
    config: &AnalyzerConfig,
    mode: StreamMode,
) -> DeadincResult<UnitReport> {
    let mut state: Option<AnalysisState> = None;
    let mut skipped_lines = 0;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let event = match parse_event_line(line) {
            None => continue,
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                if mode == StreamMode::Strict {
                    return Err(DeadincError::parse_at(path, e.to_string(), line_no));
                }
                warn!(path = %path.display(), line = line_no, error = %e, "skipping malformed event");
                skipped_lines += 1;
                continue;
            }
        };

        match state.as_mut() {
            Some(unit) => apply_event(unit, event),
            None => match event {
                Event::MainFile { path: main_file } => {
                    state = Some(AnalysisState::new(main_file, config.clone()));
                }
                _ => {
                    return Err(DeadincError::parse_at(path, "event before main_file", line_no));
                }
            },
        }
    }

    match state {
        Some(unit) => {
            let mut report = unit.into_report();
            report.skipped_lines = skipped_lines;
            Ok(report)
        }
        None => Err(DeadincError::parse(path, "stream has no main_file event")),
    }
}

/// Read and analyze one event stream file.
pub fn analyze_event_file(
    path: &Path,
    config: &AnalyzerConfig,
    mode: StreamMode,
) -> DeadincResult<UnitReport> {
    let content = fs::read_to_string(path).with_path(path)?;
    analyze_events(path, &content, config, mode)
}
