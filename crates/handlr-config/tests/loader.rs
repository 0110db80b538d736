//! File-based configuration loading.

use handlr_config::{ConfigError, ConfigLoader, LogFormat, RuntimeMode};
use serde_json::json;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_file() {
    let file = config_file(
        ".toml",
        r#"
            mode = "production"

            [logging]
            level = "handlr_runtime=debug,info"

            [settings.db]
            url = "postgres://localhost/app"
            pool = 8
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.mode, RuntimeMode::Production);
    assert_eq!(config.logging.level, "handlr_runtime=debug,info");
    assert_eq!(config.settings.get_as::<u32>("db.pool").unwrap(), Some(8));
    assert_eq!(config.settings.get("db.url"), Some(&json!("postgres://localhost/app")));
}

#[test]
fn loads_json_file_over_preset() {
    let file = config_file(".json", r#"{"logging": {"format": "json"}}"#);

    let config = ConfigLoader::new()
        .with_mode(RuntimeMode::Development)
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.mode, RuntimeMode::Development);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn rejects_unknown_extension() {
    let file = config_file(".yaml", "mode: production");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

#[test]
fn reports_parse_errors() {
    let file = config_file(".toml", "mode = ");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn optional_file_is_loaded_when_present() {
    let file = config_file(".toml", "[settings]\nname = \"svc\"\n");

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.settings.get("name"), Some(&json!("svc")));
}
