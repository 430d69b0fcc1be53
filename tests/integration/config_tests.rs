use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mimedupe::cli::{Cli, OutputFormat};
use mimedupe::config::{Config, ENV_PREFIX};
use mimedupe::duplicates::COMPARE_BUFFER_SIZE;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

// Tests touching MIMEDUPE_* variables hold this lock.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert!(!config.recursive);
    assert!(!config.include_empty);
    assert_eq!(config.output, OutputFormat::Text);
    assert_eq!(config.buffer_size, COMPARE_BUFFER_SIZE);
}

#[test]
fn test_config_load_from_env() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("MIMEDUPE_BUFFER_SIZE", "16384");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: Config = figment.extract().unwrap();

    std::env::remove_var("MIMEDUPE_BUFFER_SIZE");
    assert_eq!(config.buffer_size, 16384);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
recursive = true
mime_types = ["image/*", "application/pdf"]
min_size = 1024
max_size = 1048576
skip_hidden = true
output = "json"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert!(config.recursive);
    assert_eq!(config.mime_types, vec!["image/*", "application/pdf"]);
    assert_eq!(config.min_size, Some(1024));
    assert_eq!(config.max_size, Some(1_048_576));
    assert!(config.skip_hidden);
    assert!(!config.include_empty);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_config_save_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        recursive: true,
        mime_types: vec!["text/plain".to_string()],
        output: OutputFormat::Json,
        ..Default::default()
    };

    let content = toml::to_string_pretty(&config).unwrap();
    fs::write(&config_path, content).unwrap();

    let saved_content = fs::read_to_string(&config_path).unwrap();
    assert!(saved_content.contains("recursive = true"));
    assert!(saved_content.contains("output = \"json\""));
    assert!(saved_content.contains("text/plain"));
}

#[test]
fn test_config_saved_file_loads_back() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        skip_hidden: true,
        min_size: Some(10),
        buffer_size: 4096,
        ..Default::default()
    };
    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    assert_eq!(Config::try_load_from_path(&config_path).unwrap(), config);
}

#[test]
fn test_config_invalid_toml_fallback() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    assert!(Config::try_load_from_path(&config_path).is_err());
    assert_eq!(Config::load_from_path(&config_path), Config::default());
}

#[test]
fn test_config_wrong_type_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "output = \"xml\"").unwrap();

    assert!(Config::try_load_from_path(&config_path).is_err());
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();

    let config = Config::load_from_path(&temp_dir.path().join("absent.toml"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "buffer_size = 1024\nrecursive = true\n").unwrap();

    std::env::set_var("MIMEDUPE_BUFFER_SIZE", "2048");
    let config = Config::load_from_path(&config_path);
    std::env::remove_var("MIMEDUPE_BUFFER_SIZE");

    assert_eq!(config.buffer_size, 2048);
    assert!(config.recursive);
}

#[test]
fn test_cli_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "mime_types = [\"image/*\"]\nmin_size = 100\noutput = \"json\"\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "mimedupe",
        "--mime",
        "text/plain",
        "--output",
        "text",
        "--buffer-size",
        "64KiB",
    ])
    .unwrap();
    let config = Config::load_from_path(&config_path).merge_cli(&cli);

    assert_eq!(config.mime_types, vec!["text/plain"]);
    assert_eq!(config.min_size, Some(100));
    assert_eq!(config.output, OutputFormat::Text);
    assert_eq!(config.buffer_size, 65536);
}
