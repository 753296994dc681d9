//! TOML-based configuration for svnctx.
//!
//! Every section has defaults, so an empty file is a valid configuration
//! with no context menus client selected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ClientKind;
use crate::errors::ConfigError;

/// Suffix of the metadata companion file that accompanies every asset.
pub const DEFAULT_META_SUFFIX: &str = ".meta";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which external client handles the operations.
    #[serde(default)]
    pub client: ClientConfig,

    /// Path conventions used when resolving selections.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client selection and per-client program settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The active client. `none` disables every operation.
    #[serde(default)]
    pub kind: ClientKind,

    /// Program settings used when `kind = "tortoisesvn"`.
    #[serde(default)]
    pub tortoisesvn: Option<ProgramConfig>,

    /// Program settings used when `kind = "snailsvn"`.
    #[serde(default)]
    pub snailsvn: Option<ProgramConfig>,
}

impl ClientConfig {
    /// Program settings for `kind`, if any were configured.
    pub fn program_for(&self, kind: ClientKind) -> Option<&ProgramConfig> {
        match kind {
            ClientKind::None => None,
            ClientKind::TortoiseSvn => self.tortoisesvn.as_ref(),
            ClientKind::SnailSvn => self.snailsvn.as_ref(),
        }
    }
}

/// How to launch an external client program.
///
/// `commands` maps a command name (`commit`, `get_locks`, ...) to an argument
/// template. Templates may contain `{paths}`, `{path}` and `{url}`. Commands
/// without a template are launched as `<program> <command> <paths...>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Executable to launch.
    pub program: PathBuf,

    /// When set, `{paths}` is joined with this separator into one argument.
    /// Otherwise an argument that is exactly `{paths}` expands to one
    /// argument per path.
    #[serde(default)]
    pub path_separator: Option<String>,

    /// Argument templates keyed by command name.
    #[serde(default)]
    pub commands: HashMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Path conventions of the project layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Path that stands for the whole project in "All" operations.
    #[serde(default = "default_project_root")]
    pub project_root: String,

    /// Top-level asset folder. It has no companion file of its own, so a
    /// selection of just this folder is treated as the whole project.
    #[serde(default = "default_root_alias")]
    pub root_alias: String,

    /// Suffix of metadata companion files.
    #[serde(default = "default_meta_suffix")]
    pub meta_suffix: String,
}

fn default_project_root() -> String {
    ".".into()
}
fn default_root_alias() -> String {
    "Assets".into()
}
fn default_meta_suffix() -> String {
    DEFAULT_META_SUFFIX.into()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            root_alias: default_root_alias(),
            meta_suffix: default_meta_suffix(),
        }
    }
}

impl SelectionConfig {
    /// Companion path of `path`.
    pub fn meta_path(&self, path: &str) -> String {
        format!("{}{}", path, self.meta_suffix)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!(client = %config.client.kind, "configuration parsed successfully");
        Ok(config)
    }

    /// Validate that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.project_root.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "selection.project_root".into(),
                detail: "project root must not be empty".into(),
            });
        }
        if self.selection.meta_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "selection.meta_suffix".into(),
                detail: "meta suffix must not be empty".into(),
            });
        }

        let programs = [
            ("client.tortoisesvn.program", &self.client.tortoisesvn),
            ("client.snailsvn.program", &self.client.snailsvn),
        ];
        for (field, program) in programs {
            if let Some(p) = program {
                if p.program.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: field.into(),
                        detail: "program path must not be empty".into(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}
