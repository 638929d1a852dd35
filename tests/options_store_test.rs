//! Loading and saving options files with fallbacks.

use strictly_clock::{
    Options, OptionsStore, Palette, Ruleset, TimeFormat, builtin_rulesets, default_player_names,
};

#[test]
fn test_missing_default_file_is_created() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let default_path = dir.path().join("default.json");
    let store = OptionsStore::new(&default_path).with_default_path(&default_path);

    let options = store.load();
    assert_eq!(options, Options::default());
    assert!(default_path.exists());
}

#[test]
fn test_missing_custom_file_falls_back_to_default_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let default_path = dir.path().join("default.json");
    let saved = Options::default().with_player_count(3);
    OptionsStore::new(&default_path)
        .save(&saved)
        .expect("save default file");

    let store = OptionsStore::new(dir.path().join("league.json")).with_default_path(&default_path);
    let options = store.load();
    assert_eq!(*options.player_count(), 3);
    assert_eq!(options.player_names().len(), 3);
}

#[test]
fn test_malformed_file_falls_back_to_builtin_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("default.json");
    std::fs::write(&path, "{ not json").expect("write file");

    let store = OptionsStore::new(&path).with_default_path(&path);
    assert_eq!(store.load(), Options::default());
}

#[test]
fn test_round_trip_preserves_options() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("custom.json");
    let options = Options::default()
        .with_default_ruleset(7)
        .with_color_palette("dracula".to_string())
        .with_time_format(TimeFormat::TwentyFourHour)
        .with_logging_enabled(false);

    let store = OptionsStore::new(&path).with_default_path(&path);
    store.save(&options).expect("save options");
    let loaded = store.load();
    assert_eq!(loaded, options);
    assert_eq!(Palette::from_name(loaded.color_palette()), Palette::Dracula);
}

#[test]
fn test_partial_file_is_normalized() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r#"{ "default": 12, "rules": [], "playerCount": 0, "timeFormat": "24h" }"#,
    )
    .expect("write file");

    let store = OptionsStore::new(&path).with_default_path(&path);
    let options = store.load();
    assert_eq!(options.rules(), &builtin_rulesets());
    assert_eq!(*options.default_ruleset(), 0);
    assert_eq!(*options.player_count(), 2);
    assert_eq!(options.player_names(), &default_player_names(2));
    assert_eq!(*options.time_format(), TimeFormat::TwentyFourHour);
}

#[test]
fn test_json_uses_documented_keys() {
    let options = Options::default().with_rules(vec![Ruleset::new("Chess", &[], true)]);
    let json = serde_json::to_value(&options).expect("serialize options");
    for key in [
        "default",
        "rules",
        "playerCount",
        "playerNames",
        "colorPalette",
        "timeFormat",
        "loggingEnabled",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(json["timeFormat"], "AMPM");
    assert_eq!(json["rules"][0]["oneTurnForAllPlayers"], true);
}

#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = OptionsStore::new(dir.path().join("missing").join("options.json"));
    let err = store.save(&Options::default()).expect_err("save should fail");
    assert!(err.message.contains("Failed to write options file"));
}
