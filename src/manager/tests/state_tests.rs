use super::*;
use proptest::prelude::*;

#[test]
fn test_happy_path_transitions() {
    let mut run = RunContext::new(3);
    for next in [
        WorkflowPhase::Parsing,
        WorkflowPhase::Reconciling,
        WorkflowPhase::Authoring,
        WorkflowPhase::Auditing,
        WorkflowPhase::Authoring,
        WorkflowPhase::Auditing,
        WorkflowPhase::Persisting,
        WorkflowPhase::Done,
    ] {
        run.transition(next).expect("valid transition");
    }
    assert_eq!(run.phase(), WorkflowPhase::Done);
}

#[test]
fn test_terminal_phases_reject_transitions() {
    let mut run = RunContext::new(3);
    run.transition(WorkflowPhase::Failed).expect("validating -> failed");
    let err = run
        .transition(WorkflowPhase::Authoring)
        .expect_err("failed is terminal");
    assert_eq!(err.to_string(), "invalid transition: Failed -> Authoring");
}

#[test]
fn test_cannot_skip_the_auditor() {
    assert!(!WorkflowPhase::Authoring.can_transition_to(WorkflowPhase::Persisting));
    assert!(!WorkflowPhase::Reconciling.can_transition_to(WorkflowPhase::Persisting));
    assert!(!WorkflowPhase::Answering.can_transition_to(WorkflowPhase::Authoring));
}

#[test]
fn test_attempt_budget() {
    let mut run = RunContext::new(2);
    assert_eq!(run.begin_attempt(), Some(1));
    assert_eq!(run.begin_attempt(), Some(2));
    assert_eq!(run.begin_attempt(), None);
    assert_eq!(run.begin_attempt(), None);
}

#[test]
fn test_assign_id_mints_in_order_and_reuses_matches() {
    let mut run = RunContext::new(3);
    let decisions = [
        ReconciliationDecision::New,
        ReconciliationDecision::Match("TC_005".to_string()),
        ReconciliationDecision::New,
    ];
    let ids: Vec<String> = decisions
        .iter()
        .map(|d| run.assign_id(d).as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["TC_NEW_001", "TC_005", "TC_NEW_002"]);
}

#[test]
fn test_duplicate_legacy_match_is_minted() {
    let mut run = RunContext::new(3);
    let matched = ReconciliationDecision::Match("TC_005".to_string());
    let first = run.assign_id(&matched);
    assert_eq!(first, TaskId("TC_005".to_string()));
    assert!(!first.is_new());
    let second = run.assign_id(&matched);
    assert_eq!(second, TaskId::minted(1));
    assert!(second.is_new());
}

#[test]
fn test_counters_are_per_run() {
    let mut first = RunContext::new(3);
    first.assign_id(&ReconciliationDecision::New);
    first.assign_id(&ReconciliationDecision::New);

    let mut second = RunContext::new(3);
    assert_eq!(second.assign_id(&ReconciliationDecision::New), TaskId::minted(1));
}

fn decision_strategy() -> impl Strategy<Value = ReconciliationDecision> {
    prop_oneof![
        Just(ReconciliationDecision::New),
        (1u32..20).prop_map(|n| ReconciliationDecision::Match(format!("TC_{:03}", n))),
    ]
}

proptest! {
    #[test]
    fn prop_assigned_ids_are_unique(decisions in proptest::collection::vec(decision_strategy(), 0..40)) {
        let mut run = RunContext::new(3);
        let mut seen = HashSet::new();
        for decision in &decisions {
            let id = run.assign_id(decision);
            prop_assert!(seen.insert(id));
        }
    }

    #[test]
    fn prop_new_ids_are_sequential(count in 1usize..30) {
        let mut run = RunContext::new(3);
        for i in 1..=count {
            let id = run.assign_id(&ReconciliationDecision::New);
            prop_assert!(id.is_new());
            prop_assert_eq!(id, TaskId::minted(i as u32));
        }
    }
}
