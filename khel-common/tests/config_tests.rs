//! Unit tests for configuration loading and resolution
//!
//! Covers:
//! - Missing config file → compiled defaults
//! - Priority order for config-file resolution (CLI → ENV → platform dirs)
//! - Partial TOML files keep defaults for omitted fields
//! - Validation of engine tuning and scoring ceilings
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate KHEL_CONFIG are marked with #[serial].

use khel_common::config::{
    load_config, load_toml_config, resolve_config_path, TomlConfig, CONFIG_ENV_VAR,
};
use khel_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_are_valid() {
    let config = TomlConfig::default();
    assert_eq!(config.port, 5731);
    assert_eq!(config.analysis.settle_frames, 10);
    assert_eq!(config.analysis.shuttle_estimator, "raw");
    assert!(config.shared_secret.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
        port = 6000
        shared_secret = "khel-secret"

        [analysis]
        shuttle_estimator = "linear_predictor"
        "#,
    );

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.port, 6000);
    assert_eq!(config.shared_secret, "khel-secret");
    assert_eq!(config.analysis.shuttle_estimator, "linear_predictor");
    // Omitted fields fall back to compiled defaults
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.analysis.calibration_attempts, 30);
    assert_eq!(config.logging.level, "info");
    assert!(config.scoring.push_ups.is_none());
}

#[test]
fn test_scoring_overrides_parsed() {
    let file = write_config(
        r#"
        [scoring]
        push_ups = 40
        vertical_jump = 75.5
        "#,
    );

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.scoring.push_ups, Some(40.0));
    assert_eq!(config.scoring.vertical_jump, Some(75.5));
}

#[test]
fn test_non_positive_ceiling_rejected() {
    let file = write_config(
        r#"
        [scoring]
        sit_ups = 0
        "#,
    );

    let err = load_toml_config(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("scoring.sit_ups")));
}

#[test]
fn test_unknown_estimator_rejected() {
    let file = write_config(
        r#"
        [analysis]
        shuttle_estimator = "kalman"
        "#,
    );

    assert!(load_toml_config(file.path()).is_err());
}

#[test]
fn test_inverted_sprint_lines_rejected() {
    let mut config = TomlConfig::default();
    config.analysis.sprint_start_x = 900.0;
    config.analysis.sprint_finish_x = 300.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let file = write_config("port = \"not a number\"");
    let err = load_toml_config(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_cli_path_beats_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/khel-from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/khel-from-cli.toml")));
    assert_eq!(resolved.as_deref(), Some(Path::new("/tmp/khel-from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    let file = write_config("port = 7001");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = load_config(None).unwrap();
    assert_eq!(config.port, 7001);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let result = load_config(Some(Path::new("/nonexistent/khel/analysis.toml")));
    assert!(result.is_err());
}
