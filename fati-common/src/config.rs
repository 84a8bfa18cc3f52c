//! Bootstrap configuration loading and root folder resolution
//!
//! Two tiers, as for every FATI tool:
//! 1. **TOML bootstrap**: root folder, logging, input file locations
//! 2. **Database settings**: populate defaults (see `db::settings`)
//!
//! # Root folder priority
//!
//! 1. Command-line argument (highest priority)
//! 2. `FATI_ROOT_FOLDER`, then `FATI_ROOT` environment variables
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: it is logged and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "FATI_ROOT_FOLDER";

/// Alternative root folder environment variable
pub const ROOT_ENV: &str = "FATI_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "fati.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Input file locations for the populate run (optional)
    #[serde(default)]
    pub import: ImportPaths,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Locations of the spreadsheet exports consumed by the loader
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportPaths {
    /// Health sector JSON export
    #[serde(default)]
    pub health_json: Option<PathBuf>,

    /// Education sector JSON export
    #[serde(default)]
    pub education_json: Option<PathBuf>,

    /// Directory holding `SEN_adm1.csv`, `SEN_adm2.csv`, `SEN_adm3.csv`
    #[serde(default)]
    pub geo_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/fati (or /var/lib/fati when no home is known)
        dirs::data_local_dir()
            .map(|d| d.join("fati"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fati"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("fati"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fati"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("fati"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fati"))
    } else {
        PathBuf::from("./fati_data")
    }
}

/// Default configuration file path for the platform
///
/// Linux checks `~/.config/fati/config.toml` first, then `/etc/fati/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("fati").join("config.toml"));

    if cfg!(target_os = "linux") {
        if let Some(path) = user_config.filter(|p| p.exists()) {
            return Some(path);
        }
        let system_config = PathBuf::from("/etc/fati/config.toml");
        return system_config.exists().then_some(system_config);
    }

    user_config.filter(|p| p.exists())
}

/// Parse TOML bootstrap configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load TOML bootstrap configuration
///
/// An explicit path that does not exist is an error; when no path is given
/// and no default file exists, compiled defaults are returned.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No config file found, using compiled defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let config = parse_toml_config(&content)?;
            debug!(path = %path.display(), "Loaded TOML config");
            Ok(config)
        }
        Err(e) if explicit.is_none() => {
            warn!("Could not read {}: {} (using defaults)", path.display(), e);
            Ok(TomlConfig::default())
        }
        Err(e) => Err(Error::Config(format!(
            "Read TOML failed ({}): {}",
            path.display(),
            e
        ))),
    }
}

/// Root folder resolution
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: toml.root_folder.clone(),
        }
    }

    /// Resolve the root folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
