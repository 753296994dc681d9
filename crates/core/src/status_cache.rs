//! Status cache query interface and an in-memory snapshot implementation.
//!
//! The resolvers never compute status themselves; they ask a [`StatusCache`].
//! [`StatusSnapshot`] is a plain map of known entries, loadable from JSON,
//! used by the command-line front-end and by tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DEFAULT_META_SUFFIX;
use crate::errors::SnapshotError;
use crate::models::{FileStatus, StatusData};

// ---------------------------------------------------------------------------
// Query interface
// ---------------------------------------------------------------------------

/// Read-only view of cached version-control status.
pub trait StatusCache: Send + Sync {
    /// Status of a single path. Paths the cache knows nothing about are
    /// reported as clean.
    fn get_status(&self, path: &str) -> StatusData;

    /// Every known status record for `path` and, with `include_meta`, for its
    /// metadata companion.
    fn get_all_known_status_data(
        &self,
        path: &str,
        include_folder: bool,
        include_meta: bool,
        include_unversioned: bool,
    ) -> Vec<StatusData>;

    /// Roots of working copies checked out inside the project.
    fn nested_repository_roots(&self) -> Vec<String>;

    /// `true` if `path` is a directory in the working copy.
    fn is_directory(&self, path: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// On-disk shape of a status snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    entries: Vec<StatusData>,
    #[serde(default)]
    nested_repositories: Vec<String>,
    #[serde(default)]
    directories: Vec<String>,
}

/// In-memory [`StatusCache`] holding only paths with non-trivial state.
///
/// Directories are the ones listed in the snapshot plus any that exist on
/// disk, resolved against the working copy root when one is set.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    entries: HashMap<String, StatusData>,
    nested_repositories: Vec<String>,
    directories: HashSet<String>,
    meta_suffix: String,
    working_copy: Option<PathBuf>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            nested_repositories: Vec::new(),
            directories: HashSet::new(),
            meta_suffix: DEFAULT_META_SUFFIX.to_string(),
            working_copy: None,
        }
    }
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a companion suffix other than `.meta`.
    pub fn with_meta_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.meta_suffix = suffix.into();
        self
    }

    /// Resolve relative paths against `root` when probing the filesystem.
    pub fn with_working_copy(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_copy = Some(root.into());
        self
    }

    /// Record (or replace) the status of `data.path`.
    pub fn insert(&mut self, data: StatusData) -> &mut Self {
        self.entries.insert(data.path.clone(), data);
        self
    }

    pub fn add_directory(&mut self, path: impl Into<String>) -> &mut Self {
        self.directories.insert(path.into());
        self
    }

    pub fn add_nested_repository(&mut self, root: impl Into<String>) -> &mut Self {
        self.nested_repositories.push(root.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a snapshot from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let mut snapshot = Self::new();
        for entry in file.entries {
            snapshot.insert(entry);
        }
        for dir in file.directories {
            snapshot.add_directory(dir);
        }
        for root in file.nested_repositories {
            snapshot.add_nested_repository(root);
        }
        Ok(snapshot)
    }

    /// Load a snapshot from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading status snapshot");

        if !path.exists() {
            return Err(SnapshotError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        debug!(
            entries = snapshot.len(),
            nested = snapshot.nested_repositories.len(),
            "status snapshot parsed"
        );
        Ok(snapshot)
    }
}

impl StatusCache for StatusSnapshot {
    fn get_status(&self, path: &str) -> StatusData {
        self.entries
            .get(path)
            .cloned()
            .unwrap_or_else(|| StatusData::normal(path))
    }

    fn get_all_known_status_data(
        &self,
        path: &str,
        include_folder: bool,
        include_meta: bool,
        include_unversioned: bool,
    ) -> Vec<StatusData> {
        let mut candidates = vec![path.to_string()];
        if include_meta {
            candidates.push(format!("{}{}", path, self.meta_suffix));
        }

        candidates
            .iter()
            .filter(|p| include_folder || !self.is_directory(p))
            .filter_map(|p| self.entries.get(p.as_str()))
            .filter(|sd| include_unversioned || sd.status != FileStatus::Unversioned)
            .cloned()
            .collect()
    }

    fn nested_repository_roots(&self) -> Vec<String> {
        self.nested_repositories.clone()
    }

    fn is_directory(&self, path: &str) -> bool {
        if self.directories.contains(path) {
            return true;
        }
        match &self.working_copy {
            Some(root) => root.join(path).is_dir(),
            None => Path::new(path).is_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LockStatus;
    use std::io::Write;

    fn sample_json() -> &'static str {
        r#"{
  "entries": [
    {"path": "Assets/Foo.png", "status": "modified"},
    {"path": "Assets/Foo.png.meta", "lock_status": "locked_here"},
    {"path": "Assets/New.txt", "status": "unversioned"},
    {"path": "Assets/Textures", "status": "added"}
  ],
  "nested_repositories": ["Packages/Shared"],
  "directories": ["Assets/Textures"]
}"#
    }

    #[test]
    fn test_unknown_path_is_clean() {
        let snapshot = StatusSnapshot::new();
        let sd = snapshot.get_status("Assets/Unknown.cs");
        assert_eq!(sd.path, "Assets/Unknown.cs");
        assert_eq!(sd.status, FileStatus::Normal);
        assert_eq!(sd.lock_status, LockStatus::NoLock);
        assert!(!sd.is_conflicted());
    }

    #[test]
    fn test_all_known_includes_meta_companion() {
        let snapshot = StatusSnapshot::from_json(sample_json()).unwrap();

        let all = snapshot.get_all_known_status_data("Assets/Foo.png", false, true, true);
        let paths: Vec<&str> = all.iter().map(|sd| sd.path.as_str()).collect();
        assert_eq!(paths, vec!["Assets/Foo.png", "Assets/Foo.png.meta"]);

        let without_meta = snapshot.get_all_known_status_data("Assets/Foo.png", false, false, true);
        assert_eq!(without_meta.len(), 1);
    }

    #[test]
    fn test_all_known_respects_folder_and_unversioned_flags() {
        let snapshot = StatusSnapshot::from_json(sample_json()).unwrap();

        assert!(snapshot
            .get_all_known_status_data("Assets/Textures", false, false, true)
            .is_empty());
        assert_eq!(
            snapshot
                .get_all_known_status_data("Assets/Textures", true, false, true)
                .len(),
            1
        );

        assert!(snapshot
            .get_all_known_status_data("Assets/New.txt", false, false, false)
            .is_empty());
        assert_eq!(
            snapshot
                .get_all_known_status_data("Assets/New.txt", false, false, true)
                .len(),
            1
        );
    }

    #[test]
    fn test_custom_meta_suffix() {
        let mut snapshot = StatusSnapshot::new().with_meta_suffix(".props");
        snapshot.insert(StatusData::normal("doc.txt.props").with_lock(LockStatus::LockedOther));
        let all = snapshot.get_all_known_status_data("doc.txt", false, true, false);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].path, "doc.txt.props");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_json().as_bytes()).unwrap();

        let snapshot = StatusSnapshot::load_from_file(&path).unwrap();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.is_directory("Assets/Textures"));
        assert_eq!(snapshot.nested_repository_roots(), vec!["Packages/Shared"]);
    }

    #[test]
    fn test_directory_on_disk_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Textures")).unwrap();
        std::fs::write(dir.path().join("Foo.png"), b"png").unwrap();

        let absolute = dir.path().join("Textures").display().to_string();
        assert!(StatusSnapshot::new().is_directory(&absolute));

        let snapshot = StatusSnapshot::new().with_working_copy(dir.path());
        assert!(snapshot.is_directory("Textures"));
        assert!(!snapshot.is_directory("Foo.png"));
        assert!(!snapshot.is_directory("Missing"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = StatusSnapshot::load_from_file("/nonexistent/status.json");
        assert!(matches!(result, Err(SnapshotError::FileNotFound(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = StatusSnapshot::load_from_file(&path);
        assert!(matches!(result, Err(SnapshotError::ParseError(_))));
    }
}
