//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "ADMIT_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "admit.db";

/// Directory (inside the root folder) holding uploaded recordings
pub const AUDIO_DIR: &str = "audio";

/// Application directory name used for config and data defaults
const APP_DIR: &str = "admit-trainer";

/// TOML configuration file contents
///
/// Every key is optional; a missing file or key falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub manager_password: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub transcription_model: Option<String>,
    pub feedback_model: Option<String>,
    pub secure_cookies: Option<bool>,
    /// Directory holding `sections.toml` / `assessment.toml` overrides
    pub content_dir: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file, degrading to defaults when it is missing or invalid
    ///
    /// An explicitly requested file that cannot be read is logged as a warning;
    /// the default location is silently skipped when absent.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("No config file found, using defaults");
                    return Self::default();
                }
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} (continuing with defaults)", e);
                Self::default()
            }
        }
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./admit_data"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Validate a secret value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve a secret from environment, then TOML
///
/// Warns when both sources carry a value so a stale copy does not go unnoticed.
pub fn resolve_secret(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment ({}) and TOML config. Using environment.",
            name, env_var
        );
    }

    match (env_value, toml_value) {
        (Some(v), _) => {
            info!("{} loaded from environment variable", name);
            Some(v)
        }
        (None, Some(v)) => {
            info!("{} loaded from TOML config", name);
            Some(v)
        }
        (None, None) => {
            warn!("{} not configured (set {} or the TOML key)", name, env_var);
            None
        }
    }
}

/// Resolved root folder with derived paths
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.path.join(AUDIO_DIR)
    }

    /// Create the root folder and the audio directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating root folder: {}", self.path.display());
        }
        std::fs::create_dir_all(&self.path)?;
        std::fs::create_dir_all(self.audio_dir())?;
        Ok(())
    }
}
