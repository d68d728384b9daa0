use super::fallback::{self, CallSite};
use super::*;
use proptest::prelude::*;

#[test]
fn test_minted_ids_are_zero_padded() {
    assert_eq!(TaskId::minted(1).as_str(), "TC_NEW_001");
    assert_eq!(TaskId::minted(42).as_str(), "TC_NEW_042");
    assert_eq!(TaskId::minted(1000).as_str(), "TC_NEW_1000");
}

#[test]
fn test_is_new_distinguishes_legacy_ids() {
    assert!(TaskId::minted(3).is_new());
    assert!(!TaskId("TC_005".to_string()).is_new());
}

#[test]
fn test_task_prompt_line() {
    let task = Task {
        id: TaskId("TC_005".to_string()),
        scenario: Scenario::from("Verify search"),
    };
    assert_eq!(task.prompt_line(), "TC_005: Verify search");
}

#[test]
fn test_outcome_serializes_lowercase_status_and_skips_empty_fields() {
    let outcome = WorkflowOutcome::rejected("Too short");
    let json = serde_json::to_value(&outcome).expect("serialize");
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["message"], "Too short");
    assert!(json.get("preview").is_none());
    assert!(json.get("file_path").is_none());

    let ok = WorkflowOutcome::success("Saved")
        .with_preview("draft")
        .with_file_path("out/TestCases_1.csv".into());
    let json = serde_json::to_value(&ok).expect("serialize");
    assert_eq!(json["status"], "success");
    assert_eq!(json["file_path"], "out/TestCases_1.csv");
    assert!(ok.is_success());
}

#[test]
fn test_every_call_site_has_a_distinct_name_and_fallback() {
    let mut names: Vec<&str> = CallSite::ALL.iter().map(|c| c.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), CallSite::ALL.len());
    assert!(CallSite::ALL.iter().all(|c| !c.fallback().is_empty()));
    assert_eq!(CallSite::SpecLookup.fallback(), fallback::NO_REQUIREMENTS);
}

#[test]
fn test_ask_failed_message() {
    assert_eq!(
        fallback::ask_failed(&"disk gone"),
        "Error retrieving data: disk gone"
    );
}

#[test]
fn test_invalid_transition_display() {
    let err = WorkflowError::InvalidTransition {
        from: "Done".to_string(),
        to: "Authoring".to_string(),
    };
    assert_eq!(err.to_string(), "invalid transition: Done -> Authoring");
}

proptest! {
    #[test]
    fn prop_minted_ids_unique_and_ordered(a in 1u32..999, b in 1u32..999) {
        prop_assume!(a < b);
        let (ia, ib) = (TaskId::minted(a), TaskId::minted(b));
        prop_assert_ne!(&ia, &ib);
        prop_assert!(ia.as_str() < ib.as_str());
        prop_assert!(ia.is_new());
    }
}
