use std::fs;
use tempfile::TempDir;
use utmgrid::config::{AppConfig, ConfigManager, Theme};

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().join("utmgrid"));
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.history.max_entries, 50);
    assert_eq!(config.autosave.debounce_ms, 500);
    assert_eq!(config.display.default_rows, 3);
    assert!(config.display.show_row_numbers);
    assert_eq!(config.notifications.toast_duration_ms, 2000);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.logging.level, "info");
    assert!(config.storage.data_dir.is_none());
    assert!(!config.debug.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[storage]"));
    assert!(template.contains("[history]"));
    assert!(template.contains("[autosave]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[logging]"));

    // The template itself must parse and validate
    let parsed: AppConfig = toml::from_str(&template).expect("template should parse");
    assert!(parsed.validate().is_ok());
    assert_eq!(parsed.history.max_entries, 50);
}

#[test]
fn test_write_default_config_respects_force() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager.write_default_config(false).unwrap();
    assert!(path.exists());
    assert!(config_manager.write_default_config(false).is_err());

    fs::write(&path, "# edited").unwrap();
    config_manager.write_default_config(true).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[history]"));
}

#[test]
fn test_load_without_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.history.max_entries, 50);
}

#[test]
fn test_user_config_overrides_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r##"
[history]
max_entries = 10

[display]
default_rows = 1
show_row_numbers = false

[theme.colors]
primary = "#ff0000"
"##,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.history.max_entries, 10);
    assert_eq!(config.display.default_rows, 1);
    assert!(!config.display.show_row_numbers);
    assert_eq!(config.theme.colors.primary, "#ff0000");
    // Untouched values keep their defaults
    assert_eq!(config.autosave.debounce_ms, 500);
    assert_eq!(config.theme.colors.error, "red");
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    let path = config_manager.config_path("config.toml");

    fs::write(&path, "[theme.colors]\nprimary = \"not_a_color\"\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[display]\ndefault_rows = 0\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "this is = = not toml").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());
}

#[test]
fn test_theme_has_every_configured_color() {
    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).unwrap();
    for (name, _) in config.theme.colors.entries() {
        assert!(theme.get_optional(name).is_some(), "missing {}", name);
    }
}
