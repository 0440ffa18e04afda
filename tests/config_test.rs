use cropscope::config::{AppConfig, ConfigManager};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert!(config.data.path.is_none());
    assert!(config.data.delimiter.is_none());
    assert_eq!(config.insights.top_n, 3);
    assert_eq!(config.insights.decimals, 2);
    assert_eq!(config.chart.width, 1024);
    assert_eq!(config.chart.height, 640);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert!(!config.debug.enabled);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager
        .generate_default_config()
        .expect("Failed to generate config");

    assert!(template.starts_with("# cropscope configuration file\n"));
    for section in ["[data]", "[insights]", "[chart]", "[performance]", "[debug]"] {
        assert!(
            template.contains(&format!("# {}", section)),
            "missing {}",
            section
        );
    }
    assert!(template.contains("# version = \"0.1\""));
    assert!(template.contains("# top_n = 3"));
    // Unset options are shown as examples
    assert!(template.contains("# path = \"data_season.csv\""));
    assert!(template.contains("# delimiter = \",\""));
    // Field documentation is carried along
    assert!(template.contains("# Number of crops listed in each Top Performers ranking"));

    // Every setting is commented out
    for line in template.lines() {
        let trimmed = line.trim();
        assert!(
            trimmed.is_empty() || trimmed.starts_with('#'),
            "uncommented line: {}",
            line
        );
    }
}

#[test]
fn test_generated_config_parses_when_uncommented() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let template = config_manager.generate_default_config().unwrap();

    // Strip "# " from setting and section lines only
    let uncommented: String = template
        .lines()
        .filter_map(|l| l.strip_prefix("# "))
        .filter(|l| {
            l.starts_with('[')
                || l.split_once(" = ").is_some_and(|(key, _)| {
                    key.chars().all(|c| c.is_ascii_lowercase() || c == '_')
                })
        })
        .map(|l| format!("{}\n", l))
        .collect();
    let config: AppConfig = toml::from_str(&uncommented).expect("template should parse");
    assert_eq!(config.data.path, Some(PathBuf::from("data_season.csv")));
    assert_eq!(config.data.delimiter, Some(','));
    assert_eq!(config.insights.top_n, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    assert_eq!(config_path, config_manager.config_path("config.toml"));
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[insights]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    fs::write(&first_path, "garbage").unwrap();

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    let content = fs::read_to_string(&second_path).unwrap();
    assert!(content.starts_with("# cropscope configuration file"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_load_minimal_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");

    let minimal_config = r#"
version = "0.1"

[data]
path = "/srv/crops/karnataka.csv"
delimiter = ";"

[insights]
top_n = 5
"#;
    fs::write(config_manager.config_path("config.toml"), minimal_config)
        .expect("Failed to write minimal config");

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");

    assert_eq!(
        config.data.path,
        Some(PathBuf::from("/srv/crops/karnataka.csv"))
    );
    assert_eq!(config.data.delimiter, Some(';'));
    assert_eq!(config.insights.top_n, 5);

    // Defaults remain for unspecified values
    assert_eq!(config.insights.decimals, 2);
    assert_eq!(config.chart.width, 1024);
}

#[test]
fn test_load_invalid_config_fails() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();

    fs::write(config_manager.config_path("config.toml"), "[chart]\nwidth = \"wide\"\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));

    fs::write(config_manager.config_path("config.toml"), "[insights]\ntop_n = 0\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("top_n"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.insights.top_n = 10;
    override_config.chart.height = 480;
    override_config.debug.log_level = "warn".to_string();
    override_config.data.delimiter = Some('\t');

    base.merge(override_config);

    assert_eq!(base.insights.top_n, 10);
    assert_eq!(base.chart.height, 480);
    assert_eq!(base.debug.log_level, "warn");
    assert_eq!(base.data.delimiter, Some('\t'));

    // Unmodified values remain default
    assert_eq!(base.chart.width, 1024);
    assert_eq!(base.insights.decimals, 2);
}

#[test]
fn test_merge_does_not_override_with_defaults() {
    let mut base = AppConfig::default();
    base.insights.top_n = 7;
    base.data.path = Some(PathBuf::from("mine.csv"));

    base.merge(AppConfig::default());

    assert_eq!(base.insights.top_n, 7);
    assert_eq!(base.data.path, Some(PathBuf::from("mine.csv")));
}

#[test]
fn test_validate_config_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..AppConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Unsupported config version"));
}

#[test]
fn test_validate_rejects_zero_values() {
    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.width = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.data.delimiter = Some('§');
    assert!(config.validate().is_err());
}
