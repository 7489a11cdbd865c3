//! Config file discovery and settings layering tests.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use mt::{CONFIG_FILE_NAME, FilterKind, Rgb, Settings, SheetError, SheetOptions};

fn write_config(directory: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = directory.path().join(CONFIG_FILE_NAME);
    fs::write(&path, body).unwrap();
    path
}

// ── Discovery ────────────────────────────────────────────────────

#[test]
fn first_config_found_wins() {
    let system = tempfile::tempdir().unwrap();
    let user = tempfile::tempdir().unwrap();
    write_config(&system, r#"{ "numcaps": 9 }"#);
    write_config(&user, r#"{ "numcaps": 16, "columns": 4 }"#);

    let settings = Settings::discover_in(&[
        system.path().to_path_buf(),
        user.path().to_path_buf(),
    ])
    .unwrap();

    assert_eq!(settings.numcaps, Some(9));
    assert_eq!(settings.columns, None);
}

#[test]
fn directories_without_config_are_skipped() {
    let empty = tempfile::tempdir().unwrap();
    let user = tempfile::tempdir().unwrap();
    write_config(&user, r#"{ "padding": 0 }"#);

    let settings =
        Settings::discover_in(&[empty.path().to_path_buf(), user.path().to_path_buf()]).unwrap();
    assert_eq!(settings.padding, Some(0));
}

#[test]
fn no_config_gives_empty_settings() {
    let empty = tempfile::tempdir().unwrap();
    let settings = Settings::discover_in(&[empty.path().to_path_buf()]).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn unknown_keys_are_ignored() {
    let directory = tempfile::tempdir().unwrap();
    let path = write_config(&directory, r#"{ "columns": 3, "upload_to": "nowhere" }"#);
    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.columns, Some(3));
}

#[test]
fn malformed_config_is_an_error() {
    let directory = tempfile::tempdir().unwrap();
    let path = write_config(&directory, "{ numcaps: ");
    let error = Settings::from_file(&path).unwrap_err();
    assert!(matches!(error, SheetError::ConfigFile { .. }));
}

// ── Environment ──────────────────────────────────────────────────

#[test]
fn environment_variables_use_the_prefix() {
    let variables: HashMap<&str, &str> = HashMap::from([
        ("MT_NUMCAPS", "12"),
        ("MT_SKIP_BLANK", "true"),
        ("MT_BG_HEADER", "10,20,30"),
        ("MT_TIMESTAMP_OPACITY", "0.5"),
        ("NUMCAPS", "99"),
    ]);
    let settings =
        Settings::from_env(|key| variables.get(key).map(|value| value.to_string()));

    assert_eq!(settings.numcaps, Some(12));
    assert_eq!(settings.skip_blank, Some(true));
    assert_eq!(settings.bg_header.as_deref(), Some("10,20,30"));
    assert_eq!(settings.timestamp_opacity, Some(0.5));
    assert_eq!(settings.columns, None);
}

#[test]
fn unparsable_environment_values_are_ignored() {
    let variables = HashMap::from([("MT_COLUMNS", "many"), ("MT_HEADER", "perhaps")]);
    let settings =
        Settings::from_env(|key| variables.get(key).map(|value| value.to_string()));
    assert_eq!(settings.columns, None);
    assert_eq!(settings.header, None);
}

// ── Layering ─────────────────────────────────────────────────────

#[test]
fn later_layers_win() {
    let file = Settings {
        numcaps: Some(9),
        columns: Some(3),
        filter: Some("invert".to_string()),
        ..Settings::default()
    };
    let environment = Settings {
        columns: Some(4),
        ..Settings::default()
    };
    let command_line = Settings {
        numcaps: Some(20),
        ..Settings::default()
    };

    let merged = file.overlay(environment).overlay(command_line);
    assert_eq!(merged.numcaps, Some(20));
    assert_eq!(merged.columns, Some(4));
    assert_eq!(merged.filter.as_deref(), Some("invert"));
}

#[test]
fn empty_layers_resolve_to_defaults() {
    let options = Settings::default().into_options().unwrap();
    assert_eq!(options, SheetOptions::new());
}

#[test]
fn values_are_resolved_into_options() {
    let settings = Settings {
        numcaps: Some(12),
        width: Some(0),
        height: Some(180),
        bg_content: Some("255,0,0".to_string()),
        filter: Some("grayscale".to_string()),
        watermark: Some("logo.png".to_string()),
        header_image: Some(String::new()),
        ..Settings::default()
    };
    let options = settings.into_options().unwrap();

    assert_eq!(options.capture_count, 12);
    assert_eq!(options.thumbnail_size.width, 0);
    assert_eq!(options.thumbnail_size.height, 180);
    assert_eq!(options.content_background, Rgb(255, 0, 0));
    assert_eq!(options.filter, FilterKind::Greyscale);
    assert_eq!(options.watermark, Some(PathBuf::from("logo.png")));
    assert_eq!(options.header_image, None);
}

#[test]
fn bad_colors_and_filters_fall_back() {
    let settings = Settings {
        bg_header: Some("red".to_string()),
        fg_header: Some("300,0,0".to_string()),
        filter: Some("sepia".to_string()),
        ..Settings::default()
    };
    let options = settings.into_options().unwrap();

    assert_eq!(options.header_background, Rgb::BLACK);
    assert_eq!(options.header_foreground, Rgb::WHITE);
    assert_eq!(options.filter, FilterKind::None);
}

#[test]
fn invalid_counts_are_rejected() {
    let settings = Settings {
        columns: Some(0),
        ..Settings::default()
    };
    assert!(matches!(
        settings.into_options(),
        Err(SheetError::InvalidConfiguration(_))
    ));
}
