use super::*;
use crate::testing::ScriptedGenerator;

#[test]
fn test_role_names() {
    let names: Vec<&str> = AgentRole::ALL.iter().map(|r| r.as_str()).collect();
    assert_eq!(
        names,
        vec!["manager", "archivist", "author", "auditor", "scribe"]
    );
}

#[test]
fn test_generation_error_display() {
    assert_eq!(GenerationError::Timeout.to_string(), "generation timed out");
    assert_eq!(
        GenerationError::Status(503).to_string(),
        "generation service returned HTTP 503"
    );
}

#[tokio::test]
async fn test_deadline_passes_result_through() {
    let generator = ScriptedGenerator::new().respond(AgentRole::Author, "draft");
    let result = generate_with_deadline(
        &generator,
        AgentRole::Author,
        PromptRequest::new("go"),
        Duration::from_secs(5),
    )
    .await;
    assert_eq!(result, Ok("draft".to_string()));
}

#[tokio::test]
async fn test_deadline_expiry_is_timeout() {
    let generator = ScriptedGenerator::new()
        .respond(AgentRole::Auditor, "late")
        .with_delay(Duration::from_millis(500));
    let result = generate_with_deadline(
        &generator,
        AgentRole::Auditor,
        PromptRequest::new("review"),
        Duration::from_millis(20),
    )
    .await;
    assert_eq!(result, Err(GenerationError::Timeout));
}
