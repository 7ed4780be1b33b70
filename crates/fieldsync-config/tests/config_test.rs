#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use fieldsync_config::{
    Config, ConfigError, Defaults, LogFormat, Profile, init_tracing, load_config_from,
    profile_to_connector_config, save_config_to,
};

const LAB_CONFIG: &str = r#"
default_profile = "lab"

[defaults]
log_level = "debug"
log_format = "json"
state_storage = false

[profiles.lab]
connector_id = "550e8400-e29b-41d4-a716-446655440000"
identifier = "lab-mqtt"

[profiles.bench]
connector_id = "550e8400-e29b-41d4-a716-446655440001"
state_storage = true
"#;

fn lab_config() -> Config {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, LAB_CONFIG).unwrap();
    load_config_from(&path).unwrap()
}

fn profile(connector_id: &str, identifier: &str) -> Profile {
    Profile {
        connector_id: connector_id.into(),
        identifier: identifier.into(),
        state_storage: None,
    }
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.default_profile.as_deref(), Some("default"));
    assert_eq!(config.defaults.log_level, "warn");
    assert_eq!(config.defaults.log_format, LogFormat::Text);
    assert!(config.defaults.state_storage);
    assert!(config.profiles.is_empty());
}

#[test]
fn file_layers_over_defaults() {
    let config = lab_config();

    assert_eq!(config.defaults.log_level, "debug");
    assert_eq!(config.defaults.log_format, LogFormat::Json);
    assert!(!config.defaults.state_storage);

    let (name, lab) = config.profile(None).unwrap();
    assert_eq!(name, "lab");
    assert_eq!(lab.identifier, "lab-mqtt");

    let (_, bench) = config.profile(Some("bench")).unwrap();
    assert_eq!(bench.identifier, "fb-mqtt");
}

#[test]
fn unknown_profile_is_reported() {
    let config = lab_config();
    assert!(matches!(
        config.profile(Some("garage")),
        Err(ConfigError::NoProfile { profile }) if profile == "garage"
    ));
}

#[test]
fn profile_translates_to_connector_config() {
    let config = lab_config();

    let (_, lab) = config.profile(Some("lab")).unwrap();
    let connector = profile_to_connector_config(lab, &config.defaults).unwrap();
    assert_eq!(
        connector.connector_id.to_string(),
        "550e8400-e29b-41d4-a716-446655440000"
    );
    assert_eq!(connector.identifier, "lab-mqtt");
    assert!(!connector.state_storage);

    // Profile override beats the global default.
    let (_, bench) = config.profile(Some("bench")).unwrap();
    assert!(
        profile_to_connector_config(bench, &config.defaults)
            .unwrap()
            .state_storage
    );
}

#[test]
fn translation_validates_fields() {
    let defaults = Defaults::default();

    let err = profile_to_connector_config(&profile("not-a-uuid", "lab"), &defaults).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "connector_id"));

    let err = profile_to_connector_config(
        &profile("550e8400-e29b-41d4-a716-446655440000", "  "),
        &defaults,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "identifier"));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.defaults.log_level = "info".into();
    config.profiles.insert(
        "default".into(),
        profile("550e8400-e29b-41d4-a716-446655440000", "home"),
    );
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.defaults.log_level, "info");
    let (_, home) = loaded.profile(None).unwrap();
    assert_eq!(home.identifier, "home");
    assert_eq!(home.state_storage, None);
}

#[test]
fn tracing_installs_once() {
    let defaults = Defaults {
        log_level: "debug".into(),
        ..Defaults::default()
    };

    init_tracing(&defaults).unwrap();
    assert!(matches!(
        init_tracing(&defaults),
        Err(ConfigError::Validation { ref field, .. }) if field == "tracing"
    ));
}
