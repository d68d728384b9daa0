use super::*;
use tempfile::TempDir;

#[test]
fn test_init_creates_layout() {
    let dir = TempDir::new().expect("temp dir");
    let config = WorkflowConfig::default();

    let report = init(dir.path(), &config, false).expect("init");

    assert!(dir.path().join("data/outputs").is_dir());
    assert!(dir.path().join("knowledge").is_dir());
    let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).expect("config");
    assert_eq!(written, WorkflowConfig::default_yaml());
    assert_eq!(report.created.len(), 4);
    assert!(report.existing.is_empty());
    assert!(report.summary().ends_with("Project structure is ready."));
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore"),
        "data/outputs/*.csv\ndata/outputs/*.txt\n"
    );
}

#[test]
fn test_init_is_idempotent_and_keeps_user_config() {
    let dir = TempDir::new().expect("temp dir");
    let config = WorkflowConfig::default();
    init(dir.path(), &config, false).expect("first init");
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&config_path, "policy:\n  max_attempts: 5\n").expect("edit config");

    let report = init(dir.path(), &config, false).expect("second init");

    assert!(report.created.is_empty());
    assert_eq!(report.existing.len(), 4);
    assert_eq!(
        std::fs::read_to_string(&config_path).expect("config"),
        "policy:\n  max_attempts: 5\n"
    );
}

#[test]
fn test_init_force_rewrites_config() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&config_path, "stale: true\n").expect("write");

    let report = init(dir.path(), &WorkflowConfig::default(), true).expect("init");

    assert!(report.created.contains(&config_path));
    assert_eq!(
        std::fs::read_to_string(&config_path).expect("config"),
        WorkflowConfig::default_yaml()
    );
}

#[test]
fn test_init_uses_configured_directories() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = WorkflowConfig::default();
    config.output.dir = "exports".into();
    config.knowledge_base.dir = dir.path().join("shared-kb");

    init(dir.path(), &config, false).expect("init");

    assert!(dir.path().join("exports").is_dir());
    assert!(dir.path().join("shared-kb").is_dir());
    assert!(!dir.path().join("data/outputs").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore"),
        "exports/*.csv\nexports/*.txt\n"
    );
}

#[test]
fn test_gitignore_follows_absolute_output_dir() {
    let dir = TempDir::new().expect("temp dir");
    let elsewhere = TempDir::new().expect("other dir");

    let mut inside = WorkflowConfig::default();
    inside.output.dir = dir.path().join("runs").join("csv");
    init(dir.path(), &inside, false).expect("init");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore"),
        "runs/csv/*.csv\nruns/csv/*.txt\n"
    );

    let other = TempDir::new().expect("temp dir");
    let mut outside = WorkflowConfig::default();
    outside.output.dir = elsewhere.path().join("out");
    let report = init(other.path(), &outside, false).expect("init");
    assert!(elsewhere.path().join("out").is_dir());
    assert!(!other.path().join(".gitignore").exists());
    assert_eq!(report.created.len(), 3);
}

#[test]
fn test_scaffolded_config_loads() {
    let dir = TempDir::new().expect("temp dir");
    init(dir.path(), &WorkflowConfig::default(), false).expect("init");
    let loaded = WorkflowConfig::load(&dir.path().join(CONFIG_FILE_NAME)).expect("load");
    assert_eq!(loaded.policy.max_attempts, 3);
}
