use super::*;

#[test]
fn test_request_body_is_non_streaming_with_system_field() {
    let request = PromptRequest::new("scenario text").with_system_prompt("be strict");
    let body = build_request_body("llama3", &request, 0.2).expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("json");

    assert_eq!(json["model"], "llama3");
    assert_eq!(json["prompt"], "scenario text");
    assert_eq!(json["system"], "be strict");
    assert_eq!(json["stream"], false);
    assert!(json["options"]["temperature"].as_f64().is_some());
}

#[test]
fn test_request_body_omits_missing_system_prompt() {
    let body = build_request_body("llama3", &PromptRequest::new("x"), 0.0).expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert!(json.get("system").is_none());
}

#[test]
fn test_parse_response_body_trims_text() {
    let text = parse_response_body(r#"{"model":"llama3","response":"  STATUS: APPROVED \n","done":true}"#)
        .expect("parsed");
    assert_eq!(text, "STATUS: APPROVED");
}

#[test]
fn test_parse_response_body_errors() {
    assert_eq!(
        parse_response_body(r#"{"response":"   "}"#),
        Err(GenerationError::EmptyOutput)
    );
    assert!(matches!(
        parse_response_body("<html>bad gateway</html>"),
        Err(GenerationError::InvalidResponse(_))
    ));
}

#[test]
fn test_model_for_uses_role_override() {
    let mut config = LlmConfig::default();
    config.default_model = "mistral".to_string();
    config.models.author = Some("codellama".to_string());
    let client = OllamaClient::new(config);

    assert_eq!(client.model_for(AgentRole::Author), "codellama");
    assert_eq!(client.model_for(AgentRole::Auditor), "mistral");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let mut config = LlmConfig::default();
    config.base_url = "http://127.0.0.1:1".to_string();
    config.timeout_secs = 2;
    let client = OllamaClient::new(config);

    let result = client
        .generate(AgentRole::Manager, PromptRequest::new("hello"))
        .await;
    assert!(matches!(
        result,
        Err(GenerationError::Transport(_)) | Err(GenerationError::Timeout)
    ));
}
