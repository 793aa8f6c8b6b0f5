/*!
 * Tests for application configuration functionality
 */

use page_autotranslate::app_config::{Config, LogLevel, SelectTranslatorMode};
use page_autotranslate::config_store::ConfigStore;
use tempfile::TempDir;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language, "en");
    assert!(config.page_translator.detect_language_by_content);
    assert!(config.page_translator.ignored_tags.contains(&"script".to_string()));
    assert!(config.select_translator.enabled);
    assert!(config.select_translator.disable_while_translate_page);
    assert_eq!(config.select_translator.mode, SelectTranslatorMode::QuickTranslate);
    assert_eq!(config.select_translator.timeout_for_hiding_ms, 3000);
    assert!(config.auto_translate.allow_same_language);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.language = "xyz1".to_string();
    assert!(config.validate().is_err());

    config.language = "de".to_string();
    config.select_translator.timeout_for_hiding_ms = 0;
    assert!(config.validate().is_err());

    config.select_translator.timeout_for_hiding_ms = 1500;
    config.page_translator.ignored_tags.push("  ".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_from_json_withPartialDocument_shouldFillDefaults() {
    let config = Config::from_json(
        r#"{
            "language": "fr",
            "select_translator": { "mode": "contextMenu", "strict_selection": true }
        }"#,
    )
    .unwrap();

    assert_eq!(config.language, "fr");
    assert_eq!(config.select_translator.mode, SelectTranslatorMode::ContextMenu);
    assert!(config.select_translator.strict_selection);
    assert!(config.select_translator.enabled);
    assert_eq!(config.page_translator, Config::default().page_translator);
}

#[test]
fn test_from_json_withInvalidMode_shouldFail() {
    let result = Config::from_json(r#"{ "select_translator": { "mode": "telepathy" } }"#);
    assert!(result.is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(created, Config::default());

    let mut changed = created.clone();
    changed.language = "ja".to_string();
    changed.save(&path).unwrap();

    let loaded = Config::load_or_create(&path).unwrap();
    assert_eq!(loaded.language, "ja");
}

#[test]
fn test_select_mode_fromStr_shouldAcceptAliases() {
    assert_eq!("quick".parse::<SelectTranslatorMode>().unwrap(), SelectTranslatorMode::QuickTranslate);
    assert_eq!("context-menu".parse::<SelectTranslatorMode>().unwrap(), SelectTranslatorMode::ContextMenu);
    assert_eq!("OFF".parse::<SelectTranslatorMode>().unwrap(), SelectTranslatorMode::Off);
    assert!("sometimes".parse::<SelectTranslatorMode>().is_err());
}

#[test]
fn test_fingerprint_shouldTrackEverySelectionField() {
    let base = Config::default().select_translator;
    let same = base.clone();
    assert_eq!(base.fingerprint(), same.fingerprint());

    let mut timeout = base.clone();
    timeout.timeout_for_hiding_ms += 1;
    assert_ne!(base.fingerprint(), timeout.fingerprint());

    let mut mode = base.clone();
    mode.mode = SelectTranslatorMode::Off;
    assert_ne!(base.fingerprint(), mode.fingerprint());

    assert_eq!(base.fingerprint().to_hex().len(), 64);
}

#[test]
fn test_config_store_modify_shouldPublishSnapshotsInOrder() {
    let store = ConfigStore::new(Config::default());
    let mut changes = store.subscribe();

    store.modify(|config| config.language = "de".to_string());
    store.modify(|config| config.language = "fr".to_string());

    assert_eq!(changes.try_recv().unwrap().language, "de");
    assert_eq!(changes.try_recv().unwrap().language, "fr");
    assert!(changes.try_recv().is_err());
    assert_eq!(store.snapshot().language, "fr");
}

#[test]
fn test_config_store_replace_shouldPublishWholeSnapshot() {
    let store = ConfigStore::new(Config::default());
    let mut changes = store.subscribe();

    let mut next = Config::default();
    next.select_translator.enabled = false;
    store.replace(next.clone());

    assert_eq!(*changes.try_recv().unwrap(), next);
    assert!(!store.snapshot().select_translator.enabled);
}
