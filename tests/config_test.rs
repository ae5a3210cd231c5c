use mediagrab::utils::{AppConfig, ConfigStore, MediaGrabError, ThemeChoice};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let store = ConfigStore::open_with_finder(&path, || None).unwrap();
    assert_eq!(store.snapshot(), AppConfig::default());
    assert!(path.exists());

    let on_disk: AppConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, AppConfig::default());
}

#[test]
fn test_encoder_lookup_fills_empty_path_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let store =
        ConfigStore::open_with_finder(&path, || Some(PathBuf::from("/usr/bin/ffmpeg"))).unwrap();
    assert_eq!(
        store.snapshot().system_settings.ffmpeg_path,
        PathBuf::from("/usr/bin/ffmpeg")
    );

    // Reopening does not search again once a path is stored
    let reopened =
        ConfigStore::open_with_finder(&path, || panic!("lookup should not run")).unwrap();
    assert_eq!(
        reopened.snapshot().system_settings.ffmpeg_path,
        PathBuf::from("/usr/bin/ffmpeg")
    );
}

#[test]
fn test_corrupt_file_is_replaced_by_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let store = ConfigStore::open_with_finder(&path, || None).unwrap();
    assert_eq!(store.snapshot(), AppConfig::default());

    let repaired: AppConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(repaired, AppConfig::default());
}

#[test]
fn test_unreadable_config_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep.txt"), "user data").unwrap();

    let result = ConfigStore::open_with_finder(&path, || None);
    assert!(matches!(result, Err(MediaGrabError::IoError(_))));
    assert!(path.is_dir());
    assert_eq!(
        std::fs::read_to_string(path.join("keep.txt")).unwrap(),
        "user data"
    );
}

#[test]
fn test_update_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::open_with_finder(&path, || None).unwrap();

    let mut config = store.snapshot();
    config.system_settings.theme = ThemeChoice::Light;
    config.default_preferences.audio_format = "mp3".to_string();
    config.advanced.retries = 3;
    store.update(config.clone()).unwrap();
    assert_eq!(store.snapshot(), config);

    let reopened = ConfigStore::open_with_finder(&path, || None).unwrap();
    assert_eq!(reopened.snapshot(), config);
}

#[test]
fn test_invalid_update_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::open_with_finder(&path, || None).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let mut config = store.snapshot();
    config.system_settings.output_directory = PathBuf::new();
    assert!(matches!(
        store.update(config),
        Err(MediaGrabError::InvalidConfig(_))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}
