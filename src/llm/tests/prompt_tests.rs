use super::*;

#[test]
fn test_merged_without_system_prompt_is_user_prompt() {
    let request = PromptRequest::new("Classify this scenario");
    assert_eq!(request.merged(), "Classify this scenario");
}

#[test]
fn test_merged_wraps_system_prompt() {
    let request = PromptRequest::new("Draft the cases").with_system_prompt("You are the Author.");
    let merged = request.merged();
    assert!(merged.starts_with("<system-context>\nYou are the Author.\n</system-context>"));
    assert!(merged.ends_with("Draft the cases"));
}
