//! Service configuration
//!
//! Defines the `filebridge.toml` format. Every field has a default, so an
//! empty file (or no file at all) gives a working local setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::folders::default_excluded_dirs;
use crate::types::{default_buildable_kinds, ProjectKind};

/// Name of the per-workspace config file
pub const CONFIG_FILE_NAME: &str = "filebridge.toml";

/// Error types for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// The complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub folders: FolderConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Where the HTTP listener binds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which solution the host serves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Explicit solution file; otherwise `root` is searched for one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<PathBuf>,

    /// Directory searched for a `*.sln` file
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Editor session signals, relative to the solution directory
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".filebridge/session.yaml")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            solution: None,
            root: default_root(),
            session_file: default_session_file(),
        }
    }
}

/// Folder listing options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Directory names pruned from listings; dot directories are always pruned
    #[serde(default = "default_excluded_dirs")]
    pub excluded: Vec<String>,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            excluded: default_excluded_dirs(),
        }
    }
}

/// Best-guess resolver options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Project kinds preferred when nothing is selected or open
    #[serde(default = "default_buildable_kinds")]
    pub buildable_kinds: Vec<ProjectKind>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            buildable_kinds: default_buildable_kinds(),
        }
    }
}

/// Output pane options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Name of the diagnostic output pane
    #[serde(default = "default_pane")]
    pub pane: String,

    /// Where pane logs are written; defaults to `.filebridge/logs` under the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_pane() -> String {
    "File Receiver".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            pane: default_pane(),
            directory: None,
        }
    }
}

impl BridgeConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Locate and load configuration.
    ///
    /// Search order: `explicit`, `<dir>/filebridge.toml`, the user config
    /// directory, then built-in defaults. Returns the file that was used.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let local = dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok((Self::load(&local)?, Some(local)));
        }

        if let Some(user) = user_config_path() {
            if user.is_file() {
                return Ok((Self::load(&user)?, Some(user)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Apply `FILEBRIDGE_HOST` / `FILEBRIDGE_PORT` overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(
            std::env::var("FILEBRIDGE_HOST").ok(),
            std::env::var("FILEBRIDGE_PORT").ok(),
        )
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "FILEBRIDGE_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    /// Directory that holds the pane log file
    pub fn log_directory(&self) -> PathBuf {
        self.log
            .directory
            .clone()
            .unwrap_or_else(|| self.workspace.root.join(".filebridge").join("logs"))
    }

    /// Render as TOML (used by `filebridge init`)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `<config dir>/filebridge/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filebridge").join("config.toml"))
}
