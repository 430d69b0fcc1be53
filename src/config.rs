//! Application configuration management.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, or `config.toml` in the platform config
//!    directory)
//! 3. Environment variables prefixed with `MIMEDUPE_` (e.g.
//!    `MIMEDUPE_RECURSIVE=true`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! recursive = true
//! mime_types = ["image/*", "application/pdf"]
//! min_size = 1024
//! skip_hidden = true
//! output = "json"
//! buffer_size = 65536
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::COMPARE_BUFFER_SIZE;
use crate::scanner::{MimeFilter, WalkerConfig};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "MIMEDUPE_";

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("Failed to determine project directories")]
    NoConfigDir,

    /// A configuration layer could not be parsed.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Run options for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// MIME type patterns to keep. Empty means all types.
    pub mime_types: Vec<String>,
    /// Minimum file size in bytes.
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    pub max_size: Option<u64>,
    /// Keep zero-length files.
    pub include_empty: bool,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Report format.
    pub output: OutputFormat,
    /// Comparator chunk size in bytes.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursive: false,
            mime_types: Vec::new(),
            min_size: None,
            max_size: None,
            include_empty: false,
            skip_hidden: false,
            output: OutputFormat::Text,
            buffer_size: COMPARE_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load the configuration from defaults, the default config file and the
    /// environment.
    ///
    /// Falls back to defaults with a warning if any layer is invalid.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from_path(&path),
            Err(e) => {
                log::debug!("{}; using defaults and environment only", e);
                Self::extract_or_default(Self::base_figment())
            }
        }
    }

    /// Load the configuration using `path` as the TOML layer.
    ///
    /// A missing file is not an error. Falls back to defaults with a warning
    /// if any layer is invalid.
    pub fn load_from_path(path: &Path) -> Self {
        log::debug!("Loading configuration from {}", path.display());
        Self::extract_or_default(Self::figment_for(path))
    }

    /// Strictly load the configuration, reporting invalid layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or environment cannot be
    /// parsed into a [`Config`].
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::figment_for(path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn figment_for(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract_or_default(figment: Figment) -> Self {
        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no home directory is known.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let project_dirs =
            ProjectDirs::from("com", "mimedupe", "mimedupe").ok_or(ConfigError::NoConfigDir)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded configuration.
    ///
    /// Boolean flags can only switch a setting on. Repeated `--mime` options
    /// replace the configured list.
    #[must_use]
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        self.recursive |= cli.recursive;
        self.include_empty |= cli.include_empty;
        self.skip_hidden |= cli.skip_hidden;
        if !cli.mime_types.is_empty() {
            self.mime_types.clone_from(&cli.mime_types);
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if let Some(buffer_size) = cli.buffer_size {
            self.buffer_size = usize::try_from(buffer_size).unwrap_or(usize::MAX);
        }
        self
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            recursive: self.recursive,
            skip_hidden: self.skip_hidden,
            include_empty: self.include_empty,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }

    /// Content type filter derived from this configuration.
    #[must_use]
    pub fn mime_filter(&self) -> MimeFilter {
        MimeFilter::new(&self.mime_types)
    }
}
