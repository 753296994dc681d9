//! Version-control status model.
//!
//! A path's state is described on three independent axes: content
//! ([`FileStatus`]), properties ([`PropertiesStatus`]) and locks
//! ([`LockStatus`]). Decisions in this crate always read one axis at a time.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content status
// ---------------------------------------------------------------------------

/// Content state of a working-copy entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Normal,
    Modified,
    Added,
    Deleted,
    Missing,
    Replaced,
    Conflicted,
    Unversioned,
    Ignored,
    External,
    Incomplete,
    Obstructed,
}

impl FileStatus {
    /// `true` for every state that has a diff to show.
    ///
    /// `Normal` has nothing to show, `Unversioned` has no base to compare
    /// against, and `Conflicted` needs resolving rather than diffing.
    pub fn is_modification(self) -> bool {
        !matches!(self, Self::Normal | Self::Unversioned | Self::Conflicted)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Modified => "modified",
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Missing => "missing",
            Self::Replaced => "replaced",
            Self::Conflicted => "conflicted",
            Self::Unversioned => "unversioned",
            Self::Ignored => "ignored",
            Self::External => "external",
            Self::Incomplete => "incomplete",
            Self::Obstructed => "obstructed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Properties status
// ---------------------------------------------------------------------------

/// State of the versioned properties attached to an entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PropertiesStatus {
    #[default]
    None,
    Normal,
    Modified,
    Conflicted,
}

impl std::fmt::Display for PropertiesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Normal => write!(f, "normal"),
            Self::Modified => write!(f, "modified"),
            Self::Conflicted => write!(f, "conflicted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lock status
// ---------------------------------------------------------------------------

/// Exclusive-edit lock state of an entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    #[default]
    NoLock,
    LockedHere,
    LockedOther,
    LockedButStolen,
    BrokenLock,
}

impl LockStatus {
    /// `true` when some lock exists on the entry, held by anyone.
    pub fn is_locked(self) -> bool {
        !matches!(self, Self::NoLock)
    }
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLock => write!(f, "no_lock"),
            Self::LockedHere => write!(f, "locked_here"),
            Self::LockedOther => write!(f, "locked_other"),
            Self::LockedButStolen => write!(f, "locked_but_stolen"),
            Self::BrokenLock => write!(f, "broken_lock"),
        }
    }
}

// ---------------------------------------------------------------------------
// Status record
// ---------------------------------------------------------------------------

/// Cached version-control status of a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusData {
    pub path: String,

    #[serde(default)]
    pub status: FileStatus,

    #[serde(default)]
    pub properties_status: PropertiesStatus,

    #[serde(default)]
    pub lock_status: LockStatus,
}

impl StatusData {
    /// A record for `path` with every axis at its clean default.
    pub fn normal(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_properties(mut self, properties_status: PropertiesStatus) -> Self {
        self.properties_status = properties_status;
        self
    }

    pub fn with_lock(mut self, lock_status: LockStatus) -> Self {
        self.lock_status = lock_status;
        self
    }

    /// `true` when either the content or the properties are in conflict.
    pub fn is_conflicted(&self) -> bool {
        self.status == FileStatus::Conflicted
            || self.properties_status == PropertiesStatus::Conflicted
    }
}
