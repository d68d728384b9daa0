use super::*;
use std::path::PathBuf;

#[test]
fn test_truncate_chars_respects_char_boundaries() {
    assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
    assert_eq!(truncate_chars("short", 150), "short");
    assert_eq!(truncate_chars("", 3), "");
}

#[test]
fn test_render_success_with_preview() {
    let outcome = WorkflowOutcome::success("Success. 2 test cases saved: out.csv")
        .with_preview("Test Case ID: TC_NEW_001\n")
        .with_file_path(PathBuf::from("out.csv"));

    let rendered = render_outcome(&outcome);

    assert!(rendered.starts_with("Success. 2 test cases saved"));
    assert!(rendered.ends_with("--- PREVIEW ---\nTest Case ID: TC_NEW_001"));
}

#[test]
fn test_render_rejection() {
    let outcome = WorkflowOutcome::rejected("No scenarios found to process.");
    assert_eq!(
        render_outcome(&outcome),
        "Rejected: No scenarios found to process."
    );
}
