use seek_common::observability::LogFormat;
use seek_config::SeekConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_and_expands_placeholders() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
brave:
  api_key: "${BRAVE_API_KEY}"
  endpoint: web
  timeout_secs: 10
logging:
  format: json
  emit_stderr: true
  filter: "seek_web=debug"
"#;
    let p = write_yaml(&tmp, "seek.yaml", file_yaml);

    let config = temp_env::with_var("BRAVE_API_KEY", Some("BSA-from-env"), || {
        SeekConfigLoader::new()
            .with_file(p)
            .load()
            .expect("load seek config")
    });

    assert_eq!(config.brave.api_key.token(), "BSA-from-env");
    assert_eq!(config.brave.endpoint, "web");
    assert_eq!(
        config.brave.base_url,
        "https://api.search.brave.com/res/v1/"
    );
    assert_eq!(config.brave.timeout_secs, Some(10));
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.logging.emit_stderr);
    assert_eq!(config.logging.filter, "seek_web=debug");
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "seek.yaml",
        "brave:\n  api_key: from-file\n  endpoint: web\n",
    );

    let config = temp_env::with_vars(
        [
            ("SEEK__BRAVE__API_KEY", Some("from-env")),
            ("SEEK__BRAVE__TIMEOUT_SECS", Some("7")),
        ],
        || SeekConfigLoader::new().with_file(p).load().unwrap(),
    );

    assert_eq!(config.brave.api_key.token(), "from-env");
    assert_eq!(config.brave.timeout_secs, Some(7));
}

#[test]
#[serial]
fn environment_alone_is_enough_with_optional_file() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");

    let config = temp_env::with_var("SEEK__BRAVE__API_KEY", Some("env-only"), || {
        SeekConfigLoader::new()
            .with_optional_file(missing)
            .load()
            .unwrap()
    });

    assert_eq!(config.brave.api_key.token(), "env-only");
    assert_eq!(config.logging.format, LogFormat::Text);
    assert_eq!(config.logging.filter, "info");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SeekConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn empty_api_key_is_rejected() {
    let result = temp_env::with_var_unset("SEEK__BRAVE__API_KEY", || {
        SeekConfigLoader::new()
            .with_yaml_str("brave:\n  api_key: \"  \"\n")
            .load()
    });
    assert!(result.is_err());
}
