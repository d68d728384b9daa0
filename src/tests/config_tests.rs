use super::*;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}

#[test]
fn test_default_config_validates() {
    let config = WorkflowConfig::default_config().expect("embedded config parses");
    assert!(config.validate().is_ok());
    assert_eq!(config.policy.max_attempts, 3);
    assert_eq!(config.policy.min_input_chars, 12);
    assert_eq!(config.policy.feedback_snippet_chars, 150);
    assert_eq!(config.policy.id_guard.max_phrase_len, 20);
    assert_eq!(config.output.dir, PathBuf::from("data/outputs"));
}

#[test]
fn test_embedded_yaml_matches_struct_defaults() {
    let embedded: WorkflowConfig =
        serde_yaml::from_str(WorkflowConfig::default_yaml()).expect("embedded yaml");
    let defaults = WorkflowConfig::default();

    assert_eq!(embedded.policy.greetings, defaults.policy.greetings);
    assert_eq!(embedded.policy.question_phrases, defaults.policy.question_phrases);
    assert_eq!(embedded.llm.default_model, defaults.llm.default_model);
    assert_eq!(embedded.knowledge_base.top_k, defaults.knowledge_base.top_k);
}

#[test]
fn test_empty_yaml_uses_defaults() {
    let config: WorkflowConfig = serde_yaml::from_str("{}").expect("empty mapping");
    assert_eq!(config.policy.max_attempts, 3);
    assert!(config.policy.greetings.contains(&"hello".to_string()));
    assert!(config.policy.id_guard.reject_digit_leading);
    assert!(!config.output.excel_bom);
}

#[test]
fn test_model_for_falls_back_to_default() {
    let yaml = r#"
llm:
  default_model: "mistral"
  models:
    auditor: "llama3:70b"
"#;
    let config: WorkflowConfig = serde_yaml::from_str(yaml).expect("yaml");
    assert_eq!(config.model_for(AgentRole::Auditor), "llama3:70b");
    assert_eq!(config.model_for(AgentRole::Author), "mistral");
}

#[test]
fn test_validation_rejects_zero_attempts() {
    let config: WorkflowConfig =
        serde_yaml::from_str("policy:\n  max_attempts: 0\n").expect("yaml");
    let err = config.validate().expect_err("zero attempts must fail");
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn test_validation_rejects_bad_allow_pattern() {
    let yaml = r#"
policy:
  id_guard:
    allow_pattern: "TC_(unclosed"
"#;
    let config: WorkflowConfig = serde_yaml::from_str(yaml).expect("yaml");
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_empty_role_model() {
    let yaml = r#"
llm:
  models:
    scribe: "  "
"#;
    let config: WorkflowConfig = serde_yaml::from_str(yaml).expect("yaml");
    let err = config.validate().expect_err("blank model must fail");
    assert!(err.to_string().contains("scribe"));
}

#[test]
fn test_validation_rejects_zero_limits() {
    for (yaml, field) in [
        ("llm:\n  timeout_secs: 0\n", "llm.timeout_secs"),
        ("knowledge_base:\n  timeout_secs: 0\n", "knowledge_base.timeout_secs"),
        ("knowledge_base:\n  chunk_chars: 0\n", "knowledge_base.chunk_chars"),
        ("knowledge_base:\n  top_k: 0\n", "knowledge_base.top_k"),
    ] {
        let config: WorkflowConfig = serde_yaml::from_str(yaml).expect("yaml");
        let err = config.validate().expect_err("zero limit must fail");
        assert!(err.to_string().contains(field), "{}: {}", field, err);
    }
}

#[test]
#[serial]
fn test_load_reads_file_and_validates() {
    let file = write_config("policy:\n  max_attempts: 5\noutput:\n  excel_bom: true\n");
    let config = WorkflowConfig::load(file.path()).expect("load");
    assert_eq!(config.policy.max_attempts, 5);
    assert!(config.output.excel_bom);

    let bad = write_config("policy:\n  max_attempts: 0\n");
    assert!(WorkflowConfig::load(bad.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_base_url() {
    std::env::set_var(OLLAMA_BASE_URL_ENV, "http://gpu-box:11434");
    let config = WorkflowConfig::default_config();
    std::env::remove_var(OLLAMA_BASE_URL_ENV);

    assert_eq!(
        config.expect("embedded config").llm.base_url,
        "http://gpu-box:11434"
    );
}
