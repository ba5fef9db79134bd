//! Report line formatting
//!
//! Every document produces one block: a single `pass` or `error` line, or one
//! `fail` line per violation. The end-of-run summary repeats the failure and
//! error blocks under a count header.

use std::path::Path;

use crate::aggregator::{RunSummary, ValidationOutcome};

/// Formats per-document report blocks and the end-of-run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// The block for one document, without a trailing newline
    pub fn format_block(&self, path: &Path, outcome: &ValidationOutcome) -> String {
        let path = path.display();
        match outcome {
            ValidationOutcome::Pass => format!("{path}: pass"),
            ValidationOutcome::Fail(violations) => violations
                .iter()
                .map(|violation| format!("{path}: fail: {violation}"))
                .collect::<Vec<_>>()
                .join("\n"),
            ValidationOutcome::Error { stage, cause } => {
                format!("{path}: error: {}: {cause}", stage.label())
            }
        }
    }

    /// Whether a completed document is printed right away. Pass lines are
    /// dropped in quiet mode; failures and errors are always shown.
    pub fn streams(&self, outcome: &ValidationOutcome) -> bool {
        !(self.quiet && outcome.is_pass())
    }

    /// Summary text, empty in quiet mode or when everything passed
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        if self.quiet {
            return output;
        }

        let total = summary.total_documents();
        if !summary.failures.is_empty() {
            output.push_str(&format!(
                "{} of {} failed validation\n",
                summary.failures.len(),
                total
            ));
            for block in &summary.failures {
                output.push_str(block);
                output.push('\n');
            }
        }
        if !summary.errors.is_empty() {
            output.push_str(&format!(
                "{} of {} malformed documents\n",
                summary.errors.len(),
                total
            ));
            for block in &summary.errors {
                output.push_str(block);
                output.push('\n');
            }
        }

        output
    }
}
