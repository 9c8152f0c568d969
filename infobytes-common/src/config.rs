//! Configuration loading and root folder resolution
//!
//! Settings come from four places, consulted in this order where a value can
//! appear in more than one:
//! 1. Command-line argument
//! 2. Environment variable (`.env` / `.env.local` are loaded first)
//! 3. TOML config file (`infobytes.toml`)
//! 4. Compiled default
//!
//! API keys add the database `settings` table in front of the environment;
//! see [`resolve_secret`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "INFOBYTES_ROOT_FOLDER";

/// Environment variable holding the admin password
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default remote backend base URL
pub const DEFAULT_API_URL: &str = "https://trade-api-81q6.onrender.com/api/blog";

/// Default generation schedule (every 6 hours)
pub const DEFAULT_CRON: &str = "0 */6 * * *";

/// Default number of posts per scheduled batch
pub const DEFAULT_POSTS_PER_BATCH: u32 = 3;

/// Default pause between posts of a batch
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 5;

/// Config file name searched for in the config directories
const CONFIG_FILE_NAME: &str = "infobytes.toml";

/// Top-level TOML configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub site: SiteConfig,
    pub backend: BackendConfig,
    pub generator: GeneratorConfig,
    pub scheduler: SchedulerConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Info Bytes".to_string(),
            url: "http://localhost:3000".to_string(),
        }
    }
}

/// Where blog content is read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// SQLite database in the root folder
    #[default]
    Local,
    /// Remote HTTP backend speaking the blog JSON API
    Remote,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMode::Local => "local",
            BackendMode::Remote => "remote",
        }
    }
}

impl FromStr for BackendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendMode::Local),
            "remote" => Ok(BackendMode::Remote),
            other => Err(Error::Config(format!(
                "Unknown backend mode '{}' (expected 'local' or 'remote')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub pexels_api_key: Option<String>,
    pub batch_delay_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub cron: Option<String>,
    pub posts_per_batch: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub password: Option<String>,
}

/// Load `.env` and `.env.local` from the working directory.
///
/// Variables already present in the process environment are never overwritten.
pub fn load_env_files() {
    for name in [".env.local", ".env"] {
        match dotenvy::from_filename(name) {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Failed to load {}: {}", name, e),
        }
    }
}

/// Locate the TOML config file, if any
///
/// Checks `<config_dir>/infobytes/infobytes.toml`, then `/etc/infobytes/infobytes.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("infobytes").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/infobytes").join(CONFIG_FILE_NAME);
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load the TOML config from its standard location, or defaults when absent
pub fn load_toml_config() -> Result<TomlConfig> {
    match config_file_path() {
        Some(path) => load_toml_config_from(&path),
        None => {
            debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(TomlConfig::default())
        }
    }
}

/// Load the TOML config from an explicit path
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

/// Resolve the root folder: CLI → ENV → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("infobytes"))
        .unwrap_or_else(|| PathBuf::from("./infobytes_data"))
}

/// SQLite database location inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("data").join("blog.db")
}

/// Validate an API key: non-blank and not a template placeholder
pub fn is_valid_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.contains("your_")
}

/// Read a non-blank environment variable
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Pick a secret from its three sources: database → environment → TOML.
///
/// Invalid values (see [`is_valid_key`]) are skipped. Warns when more than
/// one source carries a valid value.
pub fn resolve_secret(
    label: &str,
    db_value: Option<String>,
    env_value: Option<String>,
    toml_value: Option<String>,
) -> Option<String> {
    let candidates = [
        ("database", db_value),
        ("environment", env_value),
        ("TOML", toml_value),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, value)| value.filter(|v| is_valid_key(v)).map(|v| (source, v)))
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(s, _)| *s).collect();
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            label,
            sources.join(", "),
            sources[0]
        );
    }

    valid.into_iter().next().map(|(source, value)| {
        info!("{} loaded from {}", label, source);
        value
    })
}
