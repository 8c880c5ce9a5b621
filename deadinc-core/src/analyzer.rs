//! Per-translation-unit analysis state.
//!
//! [`AnalysisState`] receives the front end's callbacks for one unit, owns
//! every table the liveness pass needs, and finalizes exactly once:
//!
//! ```text
//!   Pending ──end_of_translation_unit()──▶ Finalized(report)
//!      ▲                                       │
//!      └── declarations, usages, includes      └── further calls return the same report
//! ```
//!
//! Nothing is shared between units, so hosts may analyze many units in
//! parallel, each with its own state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::diagnostics::{diagnose, Diagnostic, DiagnosticSink, Severity};
use crate::events::{DeclarationKind, SourceLocation, UsageKind};
use crate::file_id::FileId;
use crate::index::{DeclarationIndex, UsageAccumulator};
use crate::liveness::{
    FileVerdict, IncludeAnnotation, IncludeFilter, IncludeTable, LivenessEngine, TrackOutcome,
    Verdict,
};

/// Counts summarizing one analyzed unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub tracked_includes: usize,
    pub live: usize,
    pub dead: usize,
    pub allowed: usize,
    pub redundant_allowed: usize,
    pub declaration_records: usize,
}

/// Outcome of finalizing one translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub main_file: FileId,
    /// False when the unit was skipped (empty or toolchain main file).
    pub analyzed: bool,
    pub verdicts: Vec<FileVerdict>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: UnitStats,
    /// Malformed event lines dropped while replaying a stream.
    #[serde(default)]
    pub skipped_lines: usize,
}

impl UnitReport {
    fn skipped(main_file: FileId) -> Self {
        Self {
            main_file,
            analyzed: false,
            verdicts: Vec::new(),
            diagnostics: Vec::new(),
            stats: UnitStats::default(),
            skipped_lines: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// All state of one translation unit's analysis.
#[derive(Debug)]
pub struct AnalysisState {
    config: AnalyzerConfig,
    main_file: FileId,
    active: bool,
    filter: IncludeFilter,
    declarations: DeclarationIndex,
    usages: UsageAccumulator,
    includes: IncludeTable,
    /// `None` while pending; set once by the first finalization.
    finalized: Option<UnitReport>,
}

impl AnalysisState {
    pub fn new(main_file: impl Into<FileId>, config: AnalyzerConfig) -> Self {
        let main_file = main_file.into();
        let active = !main_file.is_empty()
            && !config
                .skipped_unit_prefixes
                .iter()
                .any(|p| main_file.starts_with(p));
        if active {
            debug!(main_file = %main_file, "starting unit");
        } else {
            debug!(main_file = %main_file, "unit not analyzed");
        }

        Self {
            filter: IncludeFilter::new(&config),
            config,
            main_file,
            active,
            declarations: DeclarationIndex::new(),
            usages: UsageAccumulator::new(),
            includes: IncludeTable::new(),
            finalized: None,
        }
    }

    pub fn main_file(&self) -> &FileId {
        &self.main_file
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    /// Whether events are still being accepted.
    fn accepting(&self) -> bool {
        self.active && !self.is_finalized()
    }

    /// A declaration located outside the main file.
    pub fn on_declaration(
        &mut self,
        kind: DeclarationKind,
        name: &str,
        file: &FileId,
        external_storage: bool,
    ) {
        if !self.accepting() {
            return;
        }
        self.declarations
            .record_declaration(kind, name, file, external_storage);
    }

    /// A usage located in the main file.
    pub fn on_usage(&mut self, kind: UsageKind, name: &str) {
        if !self.accepting() {
            return;
        }
        self.usages.note(kind, name);
    }

    /// An `#include` in the main file.
    ///
    /// `annotation_check` is only consulted for includes that end up tracked.
    pub fn on_include_directive_with<F>(
        &mut self,
        file: &FileId,
        location: SourceLocation,
        angled: bool,
        resolved: bool,
        annotation_check: F,
    ) -> TrackOutcome
    where
        F: FnOnce(&FileId) -> IncludeAnnotation,
    {
        if !self.accepting() {
            return TrackOutcome::Inactive;
        }
        if !resolved {
            return TrackOutcome::Unresolved;
        }
        if self.includes.contains(file) {
            return TrackOutcome::Duplicate;
        }
        let outcome = self.filter.classify(file);
        if outcome != TrackOutcome::Tracked {
            debug!(file = %file, outcome = ?outcome, "include not tracked");
            return outcome;
        }

        let annotation = annotation_check(file);
        debug!(
            file = %file,
            angled,
            allowed = annotation.allowed,
            optional = annotation.optional,
            "include"
        );
        self.includes.insert(file.clone(), location, annotation);
        TrackOutcome::Tracked
    }

    /// An `#include` whose annotations are already known.
    pub fn on_include_directive(
        &mut self,
        file: &FileId,
        location: SourceLocation,
        angled: bool,
        resolved: bool,
        annotation: IncludeAnnotation,
    ) -> TrackOutcome {
        self.on_include_directive_with(file, location, angled, resolved, |_| annotation)
    }

    /// A macro defined in `definition_file` expanded in the main file.
    pub fn on_macro_use(&mut self, definition_file: &FileId, use_location: &SourceLocation) {
        if !self.accepting() {
            return;
        }
        debug!(file = %definition_file, at = %use_location, "macro expansion");
        self.usages.note_macro_use(definition_file);
    }

    /// Run the liveness pass on the first call; return the same report on every call.
    pub fn finalize(&mut self) -> &UnitReport {
        let report = match self.finalized.take() {
            Some(report) => report,
            None => self.build_report(),
        };
        self.finalized.insert(report)
    }

    /// End-of-unit hook: emits diagnostics into `sink` only on the first call.
    ///
    /// Returns whether this call performed the finalization.
    pub fn on_end_of_translation_unit(&mut self, sink: &mut dyn DiagnosticSink) -> bool {
        if self.is_finalized() {
            debug!(main_file = %self.main_file, "end of unit already handled");
            return false;
        }
        for diagnostic in self.finalize().diagnostics.iter().cloned() {
            sink.report(diagnostic);
        }
        true
    }

    /// The finalized report, if any.
    pub fn report(&self) -> Option<&UnitReport> {
        self.finalized.as_ref()
    }

    /// Consume the state, finalizing first if needed.
    pub fn into_report(mut self) -> UnitReport {
        match self.finalized.take() {
            Some(report) => report,
            None => self.build_report(),
        }
    }

    fn build_report(&mut self) -> UnitReport {
        if !self.active {
            return UnitReport::skipped(self.main_file.clone());
        }

        let engine = LivenessEngine::new(
            &self.config,
            &self.main_file,
            &self.declarations,
            &self.usages,
        );
        let verdicts = engine.run(&mut self.includes);
        let severity = Severity::from_warnings_as_errors(self.config.warnings_as_errors);
        let diagnostics = diagnose(&verdicts, severity);

        let count = |wanted: Verdict| verdicts.iter().filter(|v| v.verdict == wanted).count();
        let stats = UnitStats {
            tracked_includes: verdicts.len(),
            live: count(Verdict::Live),
            dead: count(Verdict::Dead),
            allowed: count(Verdict::Allowed),
            redundant_allowed: count(Verdict::RedundantlyAllowed),
            declaration_records: self.declarations.stats().records,
        };

        info!(
            main_file = %self.main_file,
            tracked = stats.tracked_includes,
            dead = stats.dead,
            redundant_allowed = stats.redundant_allowed,
            "unit finalized"
        );

        UnitReport {
            main_file: self.main_file.clone(),
            analyzed: true,
            verdicts,
            diagnostics,
            stats,
            skipped_lines: 0,
        }
    }
}
