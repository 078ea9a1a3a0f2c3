//! Loading configurations from settings files

use blueprint_core::{Blueprint, Configuration, Preset, ProxyPolicy, Settings, SettingsError};
use blueprint_reflect::{TypeRef, Value};
use blueprint_test_utils::fixture_registry;
use pretty_assertions::assert_eq;
use std::fs;

fn write_settings(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("blueprint.toml");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn file_drives_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(
        &dir,
        r#"
        array_length = 3
        populate_public_fields = true
        proxy_policy = "plain"
        "#,
    );

    let settings = Settings::from_path(&path).unwrap();
    assert_eq!(settings.preset, Preset::Deterministic);
    let config = Configuration::from_settings(&settings).unwrap();
    assert_eq!(config.proxy_policy(), ProxyPolicy::Plain);

    let blueprint = Blueprint::new(fixture_registry()).with_configuration(config);
    let ints = blueprint.construct(TypeRef::array_of("int")).unwrap();
    assert_eq!(ints.as_array().unwrap().len(), 3);

    let person = blueprint.construct("Person").unwrap();
    assert_eq!(person.field("nickname"), Some(Value::from("")));
}

#[test]
fn seeded_random_settings_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(
        &dir,
        "preset = \"random\"\nseed = 1234\nmax_string_length = 4\n",
    );
    let settings = Settings::from_path(&path).unwrap();
    let blueprint = Blueprint::new(fixture_registry());

    let first = blueprint
        .construct_with("Person", &Configuration::from_settings(&settings).unwrap())
        .unwrap();
    let second = blueprint
        .construct_with("Person", &Configuration::from_settings(&settings).unwrap())
        .unwrap();
    assert_eq!(first, second);

    let name = first.field("name").unwrap();
    let len = name.as_str().unwrap().len();
    assert!((1..=4).contains(&len), "{name:?}");
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(&dir, "max_string_length = 0\n");
    assert!(matches!(
        Settings::from_path(&path),
        Err(SettingsError::Invalid(err)) if err.is_invalid_argument()
    ));

    let path = write_settings(&dir, "proxy_policy = \"sometimes\"\n");
    assert!(matches!(Settings::from_path(&path), Err(SettingsError::Parse(_))));
}
