//! External client integrations.
//!
//! The dispatcher is written against [`ClientCapability`] only. Which
//! implementation backs it is decided once, at configuration time, from a
//! [`ClientKind`] and the host [`Platform`].

pub mod integration;
pub mod invoker;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SelectionConfig;
use crate::errors::ConfigurationError;

pub use integration::InvokerClient;
pub use invoker::{ClientCommand, CommandInvoker, Invocation, LoggingInvoker, ProcessInvoker};

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// Operations an external client integration must support.
///
/// Every method is fire-and-forget from the caller's point of view: launch
/// failures are logged by the implementation and never returned. With
/// `wait = true` the call blocks until the external program exits.
pub trait ClientCapability: Send + Sync {
    /// Which client this implementation drives.
    fn kind(&self) -> ClientKind;

    fn check_changes(&self, paths: &[String], include_meta: bool, wait: bool);

    fn diff_changes(&self, path: &str, wait: bool);

    fn resolve(&self, path: &str, wait: bool);

    fn update(&self, paths: &[String], include_meta: bool, wait: bool);

    fn commit(&self, paths: &[String], include_meta: bool, wait: bool);

    fn add(&self, paths: &[String], include_meta: bool, wait: bool);

    fn revert(&self, paths: &[String], include_meta: bool, wait: bool);

    fn resolve_all(&self, wait: bool);

    fn get_locks(&self, paths: &[String], include_meta: bool, wait: bool);

    fn release_locks(&self, paths: &[String], include_meta: bool, wait: bool);

    fn show_log(&self, path: Option<&str>, wait: bool);

    fn blame(&self, path: Option<&str>, wait: bool);

    fn cleanup(&self, wait: bool);

    fn repo_browser(&self, url: &str, wait: bool);

    fn switch(&self, local_path: &str, url: &str, wait: bool);
}

// ---------------------------------------------------------------------------
// Client kinds & platforms
// ---------------------------------------------------------------------------

/// Supported context menus clients.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// No client; every operation is a no-op.
    #[default]
    None,
    /// TortoiseSVN, Windows only.
    #[serde(rename = "tortoisesvn")]
    TortoiseSvn,
    /// SnailSVN, macOS only.
    #[serde(rename = "snailsvn")]
    SnailSvn,
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::TortoiseSvn => write!(f, "TortoiseSVN"),
            Self::SnailSvn => write!(f, "SnailSVN"),
        }
    }
}

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "Windows"),
            Self::MacOs => write!(f, "macOS"),
            Self::Linux => write!(f, "Linux"),
            Self::Other => write!(f, "this platform"),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Check whether `kind` can run on `platform`.
pub fn check_support(kind: ClientKind, platform: Platform) -> Result<(), ConfigurationError> {
    let supported = match kind {
        ClientKind::None => true,
        ClientKind::TortoiseSvn => platform == Platform::Windows,
        ClientKind::SnailSvn => platform == Platform::MacOs,
    };

    if supported {
        Ok(())
    } else {
        Err(ConfigurationError {
            client: kind,
            platform,
            reason: format!("{} is not supported on {}", kind, platform),
        })
    }
}

/// The reason `kind` is unusable on `platform`, or `None` if it is usable.
pub fn is_currently_supported(kind: ClientKind, platform: Platform) -> Option<String> {
    check_support(kind, platform).err().map(|e| e.reason)
}

/// Build the implementation for `kind`.
///
/// `ClientKind::None` yields `Ok(None)`: no implementation, every dispatch
/// is a no-op.
pub fn create_client(
    kind: ClientKind,
    platform: Platform,
    invoker: Arc<dyn ProcessInvoker>,
    selection: &SelectionConfig,
) -> Result<Option<Arc<dyn ClientCapability>>, ConfigurationError> {
    if let Err(e) = check_support(kind, platform) {
        warn!(client = %kind, %platform, reason = %e.reason, "unsupported context menus client");
        return Err(e);
    }

    if kind == ClientKind::None {
        return Ok(None);
    }

    info!(client = %kind, %platform, "created client integration");
    Ok(Some(Arc::new(InvokerClient::new(kind, invoker, selection))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_matrix() {
        assert!(check_support(ClientKind::TortoiseSvn, Platform::Windows).is_ok());
        assert!(check_support(ClientKind::SnailSvn, Platform::MacOs).is_ok());
        assert!(check_support(ClientKind::TortoiseSvn, Platform::MacOs).is_err());
        assert!(check_support(ClientKind::SnailSvn, Platform::Windows).is_err());
        assert!(check_support(ClientKind::SnailSvn, Platform::Linux).is_err());

        for platform in [Platform::Windows, Platform::MacOs, Platform::Linux, Platform::Other] {
            assert!(check_support(ClientKind::None, platform).is_ok());
        }
    }

    #[test]
    fn test_is_currently_supported_reason() {
        assert_eq!(
            is_currently_supported(ClientKind::SnailSvn, Platform::Windows).as_deref(),
            Some("SnailSVN is not supported on Windows")
        );
        assert_eq!(
            is_currently_supported(ClientKind::TortoiseSvn, Platform::MacOs).as_deref(),
            Some("TortoiseSVN is not supported on macOS")
        );
        assert_eq!(is_currently_supported(ClientKind::TortoiseSvn, Platform::Windows), None);
    }

    #[test]
    fn test_create_client() {
        let invoker: Arc<dyn ProcessInvoker> = Arc::new(LoggingInvoker::new());
        let selection = SelectionConfig::default();

        let none = create_client(ClientKind::None, Platform::Linux, invoker.clone(), &selection);
        assert!(matches!(none, Ok(None)));

        let client =
            create_client(ClientKind::SnailSvn, Platform::MacOs, invoker.clone(), &selection)
                .unwrap()
                .expect("client");
        assert_eq!(client.kind(), ClientKind::SnailSvn);

        let err = create_client(ClientKind::TortoiseSvn, Platform::Linux, invoker, &selection)
            .err()
            .expect("error");
        assert_eq!(err.client, ClientKind::TortoiseSvn);
        assert_eq!(err.platform, Platform::Linux);
    }

    #[test]
    fn test_client_kind_serde_names() {
        let kind: ClientKind = serde_json::from_str("\"tortoisesvn\"").unwrap();
        assert_eq!(kind, ClientKind::TortoiseSvn);
        let kind: ClientKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, ClientKind::None);
        assert_eq!(serde_json::to_string(&ClientKind::SnailSvn).unwrap(), "\"snailsvn\"");
    }
}
