//! Error types for the svnctx core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.
//!
//! Dispatching an operation never returns an error. Only configuration time
//! (loading files, selecting a client) can fail.

use thiserror::Error;

use crate::client::{ClientKind, Platform};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

// ---------------------------------------------------------------------------
// Client selection errors
// ---------------------------------------------------------------------------

/// The requested client cannot be used on this platform.
///
/// Raised only when (re)selecting the active client implementation. The
/// `reason` is meant to be shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported context menus client {client} on {platform}: {reason}")]
pub struct ConfigurationError {
    pub client: ClientKind,
    pub platform: Platform,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Configuration file errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Status snapshot errors
// ---------------------------------------------------------------------------

/// Errors from loading a status snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("status snapshot not found: {0}")]
    FileNotFound(String),

    #[error("status snapshot parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("status snapshot I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// External process errors
// ---------------------------------------------------------------------------

/// Errors from launching an external client program.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The program was not found.
    #[error("client program not found: {0}")]
    ProgramNotFound(String),

    /// No program is configured for the active client.
    #[error("no program configured for client {0}")]
    NotConfigured(ClientKind),

    /// The program exited with a non-zero status while being waited on.
    #[error("client program '{program}' failed (exit {exit_code})")]
    Failed { program: String, exit_code: i32 },

    /// Generic I/O wrapper.
    #[error("client program I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConfigurationError {
            client: ClientKind::SnailSvn,
            platform: Platform::Windows,
            reason: "SnailSVN is not supported on Windows".into(),
        };
        assert!(err.to_string().contains("SnailSVN is not supported"));

        let err = InvokeError::Failed {
            program: "TortoiseProc.exe".into(),
            exit_code: 2,
        };
        assert_eq!(
            err.to_string(),
            "client program 'TortoiseProc.exe' failed (exit 2)"
        );

        let err = ConfigError::InvalidValue {
            field: "selection.meta_suffix".into(),
            detail: "must not be empty".into(),
        };
        assert!(err.to_string().contains("selection.meta_suffix"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let err: CoreError = ConfigError::FileNotFound("x.toml".into()).into();
        assert!(matches!(err, CoreError::Config(_)));

        let err: CoreError = InvokeError::NotConfigured(ClientKind::TortoiseSvn).into();
        assert!(matches!(err, CoreError::Invoke(_)));
    }
}
