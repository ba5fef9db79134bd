use std::path::{Path, PathBuf};

use validate_json::{
    DocumentReport, ErrorStage, Output, ResultAggregator, RunSummary, ValidationOutcome,
};

fn fail(violations: &[&str]) -> ValidationOutcome {
    ValidationOutcome::Fail(violations.iter().map(|v| v.to_string()).collect())
}

#[test]
fn test_block_formats() {
    let output = Output::new(false);
    let path = Path::new("doc.json");

    assert_eq!(output.format_block(path, &ValidationOutcome::Pass), "doc.json: pass");
    assert_eq!(
        output.format_block(path, &fail(&["(root): foo is required", "bar: Invalid type"])),
        "doc.json: fail: (root): foo is required\ndoc.json: fail: bar: Invalid type"
    );
    assert_eq!(
        output.format_block(
            path,
            &ValidationOutcome::Error {
                stage: ErrorStage::LoadDoc,
                cause: "unexpected BOM, see `-b` flag".to_string(),
            }
        ),
        "doc.json: error: load doc: unexpected BOM, see `-b` flag"
    );
}

#[test]
fn test_quiet_drops_only_passes() {
    let output = Output::new(true);
    let path = Path::new("doc.json");

    let failed = fail(&["(root): foo is required"]);
    assert!(!output.streams(&ValidationOutcome::Pass));
    assert!(output.streams(&failed));
    assert_eq!(
        output.format_block(path, &failed),
        "doc.json: fail: (root): foo is required"
    );
}

#[test]
fn test_summary_after_aggregation() {
    let aggregator = ResultAggregator::new(Vec::new(), false);
    aggregator.record(Path::new("a.json"), ValidationOutcome::Pass);
    aggregator.record(Path::new("b.json"), fail(&["(root): foo is required"]));
    aggregator.record(
        Path::new("c.json"),
        ValidationOutcome::Error {
            stage: ErrorStage::Validate,
            cause: "EOF while parsing".to_string(),
        },
    );

    let (summary, written) = aggregator.finalize();
    let written = String::from_utf8(written).unwrap();

    let text = Output::new(false).format_summary(&summary);
    // Three streamed lines, then the summary itself.
    assert_eq!(written.lines().count(), 7);
    assert!(written.ends_with(&text));
    assert_eq!(
        text,
        "1 of 3 failed validation\n\
         b.json: fail: (root): foo is required\n\
         1 of 3 malformed documents\n\
         c.json: error: validate: EOF while parsing\n"
    );
    assert_eq!(Output::new(true).format_summary(&summary), "");
}

#[test]
fn test_all_pass_has_empty_summary() {
    let summary = RunSummary {
        reports: vec![DocumentReport::new(PathBuf::from("a.json"), ValidationOutcome::Pass)],
        ..RunSummary::default()
    };

    assert!(summary.exit_status().is_success());
    assert_eq!(Output::new(false).format_summary(&summary), "");
}
