use taskdeck::backend::TaskStatus;
use taskdeck::config::Config;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.api.endpoint = "https://abc123.execute-api.us-east-1.amazonaws.com/prod/tasks".to_string();
    config.auth.client_id = "client123".to_string();
    config
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.api.backend, "rest");
    assert_eq!(config.ui.default_view, "pending");
    assert_eq!(config.ui.default_status(), TaskStatus::Pending);
    assert_eq!(config.dictation.sample_rate, 44100);
    assert!(!config.dictation.enabled);
    assert!(!config.notifications.enabled);
    assert!(!config.logging.enabled);
}

#[test]
fn test_config_validation() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    // The REST backend needs an endpoint
    config.api.endpoint = String::new();
    assert!(config.validate().is_err());

    // ...but the local one does not
    config.api.backend = "local".to_string();
    assert!(config.validate().is_ok());

    config.api.backend = "graphql".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = valid_config();
    config.ui.default_view = "someday".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.auth.client_id = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.dictation.enabled = true;
    config.dictation.sample_rate = 96000;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_default_view_accepts_status_spellings() {
    let mut config = valid_config();
    config.ui.default_view = "in_progress".to_string();
    assert!(config.validate().is_ok());
    assert_eq!(config.ui.default_status(), TaskStatus::InProgress);
}

#[test]
fn test_partial_config_deserialization() {
    let partial_toml = r#"
[api]
backend = "local"

[ui]
default_view = "completed"

[logging]
enabled = true
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert_eq!(config.api.backend, "local");
    assert_eq!(config.ui.default_status(), TaskStatus::Completed);
    assert!(config.logging.enabled);

    // Unspecified values use defaults
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(config.auth.region, "us-east-1");
    assert_eq!(config.storage.database_file, "tasks.db");
}

#[test]
fn test_empty_config_deserialization() {
    let config: Config = toml::from_str("").unwrap();
    let default_config = Config::default();

    assert_eq!(config.api.backend, default_config.api.backend);
    assert_eq!(config.ui.default_view, default_config.ui.default_view);
    assert_eq!(config.dictation.recorder_command, default_config.dictation.recorder_command);
}

#[test]
fn test_load_from_file_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskdeck.toml");

    std::fs::write(&path, "[api]\nbackend = \"local\"\n[auth]\nclient_id = \"abc\"\n").unwrap();
    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.auth.client_id, "abc");

    std::fs::write(&path, "[api]\nbackend = \"local\"\n").unwrap();
    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_generate_config_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&config_path).unwrap();
    assert!(config_path.exists());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("# taskdeck Configuration File"));
    assert!(content.contains("default_view = \"pending\""));

    // The generated file parses back
    let parsed: Config = toml::from_str(&content).unwrap();
    assert_eq!(parsed.api.backend, "rest");
}
