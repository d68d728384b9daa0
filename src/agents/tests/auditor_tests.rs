use super::*;
use crate::llm::GenerationError;
use crate::testing::ScriptedGenerator;

fn auditor(generator: Arc<ScriptedGenerator>) -> Auditor {
    Auditor::new(generator, Deadlines::default(), AgentLog::disabled())
}

fn draft() -> Draft {
    Draft("Test Case ID: TC_NEW_001\nTitle: Add item".to_string())
}

#[tokio::test]
async fn test_approved_after_analysis_block() {
    let generator = Arc::new(ScriptedGenerator::new().respond(
        AgentRole::Auditor,
        "--- ANALYSIS ---\n* Coverage: 1 of 1\n--- END ANALYSIS ---\nSTATUS: APPROVED",
    ));
    let verdict = auditor(generator)
        .review("RULES/AC:\nCart\nTC_NEW_001: Add item", &draft())
        .await
        .expect("review");
    assert_eq!(verdict, Verdict::Approved);
}

#[tokio::test]
async fn test_rejected_feedback_strips_status_token() {
    let generator = Arc::new(ScriptedGenerator::new().respond(
        AgentRole::Auditor,
        "--- ANALYSIS ---\nmissing step\n--- END ANALYSIS ---\nSTATUS: REJECTED\nFEEDBACK: TC_NEW_001 has no expected result",
    ));
    let verdict = auditor(generator)
        .review("requirements", &draft())
        .await
        .expect("review");
    assert_eq!(
        verdict,
        Verdict::Rejected {
            feedback: "FEEDBACK: TC_NEW_001 has no expected result".to_string()
        }
    );
}

#[tokio::test]
async fn test_analysis_marker_in_decision_does_not_approve() {
    // The approval token only counts after the analysis block.
    let generator = Arc::new(ScriptedGenerator::new().respond(
        AgentRole::Auditor,
        "--- ANALYSIS ---\nWould be STATUS: APPROVED if fixed\n--- END ANALYSIS ---\nSTATUS: REJECTED",
    ));
    let verdict = auditor(generator)
        .review("requirements", &draft())
        .await
        .expect("review");
    assert!(!verdict.is_approved());
}

#[tokio::test]
async fn test_generation_failure_is_rejection_with_diagnostic() {
    let generator =
        Arc::new(ScriptedGenerator::new().fail(AgentRole::Auditor, GenerationError::Timeout));
    let verdict = auditor(generator)
        .review("requirements", &draft())
        .await
        .expect("review");
    match verdict {
        Verdict::Rejected { feedback } => assert!(feedback.contains("timed out")),
        Verdict::Approved => panic!("failure must not approve"),
    }
}

#[tokio::test]
async fn test_missing_inputs_skip_generation() {
    let generator = Arc::new(ScriptedGenerator::new());
    let auditor = auditor(generator.clone());

    assert!(auditor.review("  ", &draft()).await.is_err());
    assert!(auditor
        .review("requirements", &Draft(String::new()))
        .await
        .is_err());
    assert_eq!(generator.total_calls(), 0);
}
