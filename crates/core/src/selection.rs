//! Selection normalization and per-operation target resolution.
//!
//! A [`Selection`] is recomputed for every request and never cached. The
//! resolvers here only read it, so it can be traversed any number of times.

use tracing::debug;

use crate::config::SelectionConfig;
use crate::models::FileStatus;
use crate::status_cache::StatusCache;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated list of selected paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<String>,
}

impl Selection {
    /// Normalize raw paths: backslashes become `/`, trailing slashes are
    /// dropped, empty entries are skipped and repeats keep their first
    /// position.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for raw in paths {
            let normalized = raw.as_ref().replace('\\', "/");
            let normalized = normalized.trim_end_matches('/');
            if normalized.is_empty() {
                continue;
            }
            if !out.iter().any(|p| p == normalized) {
                out.push(normalized.to_string());
            }
        }
        Self { paths: out }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    /// The only selected path, if exactly one is selected.
    pub fn single(&self) -> Option<&str> {
        match self.paths.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Where a commit/revert style operation should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The project root plus every nested repository root.
    AllRoots,
    /// The given paths, with or without metadata companions.
    Paths {
        paths: Vec<String>,
        include_meta: bool,
    },
}

/// How a "check changes" request on a selection should be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesRoute {
    /// Nothing selected.
    Nothing,
    /// Batch change-check over the selection, companions included.
    Batch(Vec<String>),
    /// A single file: try diff/resolve before falling back to a batch.
    Single(String),
}

/// The project root followed by every nested repository root.
pub fn all_roots(cache: &dyn StatusCache, config: &SelectionConfig) -> Vec<String> {
    let mut roots = vec![config.project_root.clone()];
    for root in cache.nested_repository_roots() {
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// Resolve the target of a commit/revert on `selection`.
///
/// A lone root alias stands for the whole project. A lone path whose
/// companion is clean is sent without the companion. Everything else is
/// sent with companions.
pub fn resolve_scoped(
    selection: &Selection,
    cache: &dyn StatusCache,
    config: &SelectionConfig,
) -> Target {
    if let Some(single) = selection.single() {
        if single == config.root_alias {
            debug!(path = single, "root alias selected, targeting all roots");
            return Target::AllRoots;
        }

        let meta = cache.get_status(&config.meta_path(single));
        if meta.status == FileStatus::Normal && !meta.is_conflicted() {
            return Target::Paths {
                paths: vec![single.to_string()],
                include_meta: false,
            };
        }
    }

    Target::Paths {
        paths: selection.paths().to_vec(),
        include_meta: true,
    }
}

/// Resolve how to check changes on `selection`. Folders are never diffed.
pub fn resolve_check_changes(selection: &Selection, cache: &dyn StatusCache) -> ChangesRoute {
    match selection.single() {
        _ if selection.is_empty() => ChangesRoute::Nothing,
        Some(single) if !cache.is_directory(single) => ChangesRoute::Single(single.to_string()),
        _ => ChangesRoute::Batch(selection.paths().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileStatus, PropertiesStatus, StatusData};
    use crate::status_cache::StatusSnapshot;

    #[test]
    fn test_selection_normalization() {
        let sel = Selection::new(["Assets\\Foo.png", "", "Assets/Dir/", "Assets/Foo.png", "/"]);
        assert_eq!(sel.paths(), &["Assets/Foo.png".to_string(), "Assets/Dir".to_string()]);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.first(), Some("Assets/Foo.png"));
        assert_eq!(sel.single(), None);

        let sel: Selection = vec!["."].into_iter().collect();
        assert_eq!(sel.single(), Some("."));
        assert!(Selection::empty().is_empty());
    }

    #[test]
    fn test_selection_keeps_whitespace_in_names() {
        let sel = Selection::new([" Assets/Lead.png", "Assets/Trail.png ", "Assets/Trail.png"]);
        assert_eq!(
            sel.paths(),
            &[
                " Assets/Lead.png".to_string(),
                "Assets/Trail.png ".to_string(),
                "Assets/Trail.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_roots_includes_nested() {
        let mut cache = StatusSnapshot::new();
        cache.add_nested_repository("Packages/Shared");
        cache.add_nested_repository("Packages/Shared");
        let roots = all_roots(&cache, &SelectionConfig::default());
        assert_eq!(roots, vec![".".to_string(), "Packages/Shared".to_string()]);
    }

    #[test]
    fn test_root_alias_routes_to_all() {
        let cache = StatusSnapshot::new();
        let config = SelectionConfig::default();
        let target = resolve_scoped(&Selection::new(["Assets"]), &cache, &config);
        assert_eq!(target, Target::AllRoots);

        // Only a lone alias counts.
        let target = resolve_scoped(&Selection::new(["Assets", "Assets/Foo.png"]), &cache, &config);
        assert!(matches!(target, Target::Paths { include_meta: true, .. }));
    }

    #[test]
    fn test_clean_meta_is_excluded() {
        let cache = StatusSnapshot::new();
        let target = resolve_scoped(
            &Selection::new(["Assets/Foo.png"]),
            &cache,
            &SelectionConfig::default(),
        );
        assert_eq!(
            target,
            Target::Paths {
                paths: vec!["Assets/Foo.png".to_string()],
                include_meta: false
            }
        );
    }

    #[test]
    fn test_dirty_meta_is_included() {
        let config = SelectionConfig::default();
        for meta in [
            StatusData::normal("Assets/Foo.png.meta").with_status(FileStatus::Modified),
            StatusData::normal("Assets/Foo.png.meta").with_status(FileStatus::Unversioned),
            StatusData::normal("Assets/Foo.png.meta").with_properties(PropertiesStatus::Conflicted),
        ] {
            let mut cache = StatusSnapshot::new();
            cache.insert(meta);
            let target = resolve_scoped(&Selection::new(["Assets/Foo.png"]), &cache, &config);
            assert!(matches!(target, Target::Paths { include_meta: true, .. }));
        }
    }

    #[test]
    fn test_check_changes_routes() {
        let mut cache = StatusSnapshot::new();
        cache.add_directory("Assets/Textures");

        assert_eq!(
            resolve_check_changes(&Selection::empty(), &cache),
            ChangesRoute::Nothing
        );
        assert_eq!(
            resolve_check_changes(&Selection::new(["Assets/Textures"]), &cache),
            ChangesRoute::Batch(vec!["Assets/Textures".to_string()])
        );
        assert_eq!(
            resolve_check_changes(&Selection::new(["Assets/a.cs"]), &cache),
            ChangesRoute::Single("Assets/a.cs".to_string())
        );
        assert_eq!(
            resolve_check_changes(&Selection::new(["Assets/a.cs", "Assets/b.cs"]), &cache),
            ChangesRoute::Batch(vec!["Assets/a.cs".to_string(), "Assets/b.cs".to_string()])
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut cache = StatusSnapshot::new();
        cache.insert(StatusData::normal("Assets/Foo.png.meta").with_status(FileStatus::Modified));
        let config = SelectionConfig::default();
        let sel = Selection::new(["Assets/Foo.png"]);

        let first = resolve_scoped(&sel, &cache, &config);
        let second = resolve_scoped(&sel, &cache, &config);
        assert_eq!(first, second);
    }
}
