//! File and environment loading.

use std::io::Write;

use tempfile::NamedTempFile;
use trellis_config::{ConfigError, ConfigLoader, LogFormat};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
            [router]
            ignore_trailing_slash = true

            [logging]
            level = "warn"
            format = "pretty"
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert!(config.router.ignore_trailing_slash);
    assert!(!config.router.use_escaped_path);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_json_file() {
    let file = temp_file(".json", r#"{"router": {"use_escaped_path": true}}"#);

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert!(config.router.use_escaped_path);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_unsupported_extension() {
    let file = temp_file(".yaml", "router: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        ConfigLoader::new().with_file(&path),
        Err(ConfigError::FileNotFound { .. })
    ));

    let config = ConfigLoader::new()
        .with_optional_file(&path)
        .unwrap()
        .load()
        .unwrap();
    assert!(!config.router.ignore_trailing_slash);
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let file = temp_file(".toml", "[router\nignore_trailing_slash = true");
    assert!(matches!(
        ConfigLoader::new().with_file(file.path()),
        Err(ConfigError::TomlError(_))
    ));
}

#[test]
fn test_env_overrides_file() {
    let file = temp_file(".toml", "[router]\nignore_trailing_slash = false\n");
    std::env::set_var("TRELLIS_IT_ENV__ROUTER__IGNORE_TRAILING_SLASH", "true");
    std::env::set_var("TRELLIS_IT_ENV__LOGGING__FORMAT", "pretty");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("trellis_it_env")
        .load()
        .unwrap();

    assert!(config.router.ignore_trailing_slash);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_env_invalid_value() {
    std::env::set_var("TRELLIS_IT_BAD__ROUTER__USE_ESCAPED_PATH", "sometimes");

    let result = ConfigLoader::new().with_env_prefix("TRELLIS_IT_BAD").load();
    assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
}
