//! Result aggregation
//!
//! Worker units call [`ResultAggregator::record`] as they finish. Each call
//! streams the document's block to the output writer and files it into the
//! failure or error bucket, all under one mutex so blocks never interleave.
//! [`ResultAggregator::finalize`] consumes the aggregator after the join
//! barrier, so the read path needs no lock.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::output::Output;

/// Pipeline stage at which a document could not be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStage {
    LoadDoc,
    Validate,
    /// The worker unit itself failed (a panic inside the blocking section)
    Internal,
}

impl ErrorStage {
    pub fn label(self) -> &'static str {
        match self {
            ErrorStage::LoadDoc => "load doc",
            ErrorStage::Validate => "validate",
            ErrorStage::Internal => "internal",
        }
    }
}

/// Classification of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Pass,
    /// One description per schema violation, never empty
    Fail(Vec<String>),
    Error { stage: ErrorStage, cause: String },
}

impl ValidationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationOutcome::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, ValidationOutcome::Fail(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationOutcome::Error { .. })
    }
}

/// A recorded outcome together with the path it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub outcome: ValidationOutcome,
}

impl DocumentReport {
    pub fn new(path: PathBuf, outcome: ValidationOutcome) -> Self {
        Self { path, outcome }
    }
}

/// Process exit status: bit 0 for failures, bit 1 for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitStatus(u8);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    const FAILURES: u8 = 1;
    const ERRORS: u8 = 2;

    pub fn from_counts(failures: usize, errors: usize) -> Self {
        let mut bits = 0;
        if failures > 0 {
            bits |= Self::FAILURES;
        }
        if errors > 0 {
            bits |= Self::ERRORS;
        }
        ExitStatus(bits)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.0)
    }
}

/// Everything recorded during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One entry per document, in completion order
    pub reports: Vec<DocumentReport>,
    /// Formatted blocks of failed documents
    pub failures: Vec<String>,
    /// Formatted blocks of documents that could not be evaluated
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn total_documents(&self) -> usize {
        self.reports.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_pass()).count()
    }

    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::from_counts(self.failed_count(), self.error_count())
    }

    /// Outcome recorded for `path`, if any
    pub fn outcome_for(&self, path: &Path) -> Option<&ValidationOutcome> {
        self.reports
            .iter()
            .find(|r| r.path == path)
            .map(|r| &r.outcome)
    }
}

struct State<W> {
    out: W,
    summary: RunSummary,
}

/// Thread-safe collector shared by all worker units
pub struct ResultAggregator<W: Write + Send> {
    output: Output,
    state: Mutex<State<W>>,
}

impl<W: Write + Send> ResultAggregator<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            output: Output::new(quiet),
            state: Mutex::new(State {
                out,
                summary: RunSummary::default(),
            }),
        }
    }

    /// Record one document's outcome and stream its block.
    pub fn record(&self, path: &Path, outcome: ValidationOutcome) {
        let block = self.output.format_block(path, &outcome);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if self.output.streams(&outcome) {
            write_block(&mut state.out, &block);
        }

        match &outcome {
            ValidationOutcome::Pass => {}
            ValidationOutcome::Fail(_) => state.summary.failures.push(block),
            ValidationOutcome::Error { .. } => state.summary.errors.push(block),
        }
        state
            .summary
            .reports
            .push(DocumentReport::new(path.to_path_buf(), outcome));
    }

    /// Write the end-of-run summary and hand back the results and the writer.
    pub fn finalize(self) -> (RunSummary, W) {
        let State { mut out, summary } =
            self.state.into_inner().unwrap_or_else(PoisonError::into_inner);

        let text = self.output.format_summary(&summary);
        if !text.is_empty()
            && let Err(e) = out.write_all(text.as_bytes())
        {
            warn!(error = %e, "failed to write summary");
        }
        if let Err(e) = out.flush() {
            warn!(error = %e, "failed to flush output");
        }

        (summary, out)
    }
}

fn write_block<W: Write>(out: &mut W, block: &str) {
    if let Err(e) = writeln!(out, "{block}") {
        warn!(error = %e, "failed to write report line");
    }
}
