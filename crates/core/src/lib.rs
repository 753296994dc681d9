//! svnctx core library.
//!
//! A status-driven command resolver for SVN client integrations: given the
//! selected paths and their cached status, it decides which client operation
//! to run, on which paths, and whether metadata companions go along.
//!
//! The status cache and the program launcher are collaborators behind the
//! [`status_cache::StatusCache`] and [`client::ProcessInvoker`] traits.

pub mod client;
pub mod config;
pub mod diff_resolve;
pub mod dispatcher;
pub mod errors;
pub mod lock_batch;
pub mod models;
pub mod selection;
pub mod status_cache;

// Re-exports for convenience.
pub use client::{ClientCapability, ClientKind, Platform};
pub use config::AppConfig;
pub use dispatcher::Dispatcher;
pub use models::{FileStatus, LockStatus, PropertiesStatus, StatusData};
pub use selection::Selection;
pub use status_cache::{StatusCache, StatusSnapshot};
