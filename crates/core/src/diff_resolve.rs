//! Choosing between "show diff" and "resolve conflict" for a single asset.
//!
//! | Content status          | Properties status | Choice       |
//! |-------------------------|-------------------|--------------|
//! | modification-like       | any               | `Diff`       |
//! | any                     | `Modified`        | `Diff`       |
//! | `Conflicted`            | any but `Modified`| `Resolve`    |
//! | `Normal`/`Unversioned`  | `Conflicted`      | `Resolve`    |
//! | `Normal`/`Unversioned`  | `None`/`Normal`   | `NotHandled` |
//!
//! The asset is tried first, then its metadata companion. When neither is
//! handled the caller falls back to a batch change-check.

use tracing::debug;

use crate::client::ClientCapability;
use crate::config::SelectionConfig;
use crate::models::{FileStatus, PropertiesStatus, StatusData};
use crate::status_cache::StatusCache;

/// Outcome of inspecting one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffChoice {
    Diff,
    Resolve,
    NotHandled,
}

impl DiffChoice {
    pub fn is_handled(self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}

/// A handled choice bound to the path it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTarget {
    pub path: String,
    pub choice: DiffChoice,
}

impl DiffTarget {
    /// Forward the choice to `client`.
    pub fn apply(&self, client: &dyn ClientCapability, wait: bool) {
        match self.choice {
            DiffChoice::Diff => client.diff_changes(&self.path, wait),
            DiffChoice::Resolve => client.resolve(&self.path, wait),
            DiffChoice::NotHandled => {}
        }
    }
}

/// Decide what to do with a path from its status alone.
pub fn choose(status: &StatusData) -> DiffChoice {
    if status.status.is_modification() || status.properties_status == PropertiesStatus::Modified {
        return DiffChoice::Diff;
    }

    if status.status == FileStatus::Conflicted
        || status.properties_status == PropertiesStatus::Conflicted
    {
        return DiffChoice::Resolve;
    }

    DiffChoice::NotHandled
}

/// Try `asset_path`, then its companion. `None` when neither is handled.
pub fn choose_for_asset(
    asset_path: &str,
    cache: &dyn StatusCache,
    config: &SelectionConfig,
) -> Option<DiffTarget> {
    let candidates = [asset_path.to_string(), config.meta_path(asset_path)];

    for path in candidates {
        let choice = choose(&cache.get_status(&path));
        debug!(path = %path, ?choice, "diff/resolve choice");
        if choice.is_handled() {
            return Some(DiffTarget { path, choice });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LockStatus;
    use crate::status_cache::StatusSnapshot;

    fn sd(status: FileStatus, props: PropertiesStatus) -> StatusData {
        StatusData::normal("Assets/a.png")
            .with_status(status)
            .with_properties(props)
    }

    #[test]
    fn test_choice_table() {
        use FileStatus as F;
        use PropertiesStatus as P;

        for props in [P::None, P::Normal, P::Modified, P::Conflicted] {
            assert_eq!(choose(&sd(F::Modified, props)), DiffChoice::Diff);
            assert_eq!(choose(&sd(F::Added, props)), DiffChoice::Diff);
            assert_eq!(choose(&sd(F::Deleted, props)), DiffChoice::Diff);
        }

        assert_eq!(choose(&sd(F::Normal, P::Modified)), DiffChoice::Diff);
        assert_eq!(choose(&sd(F::Unversioned, P::Modified)), DiffChoice::Diff);
        assert_eq!(choose(&sd(F::Conflicted, P::Modified)), DiffChoice::Diff);

        assert_eq!(choose(&sd(F::Normal, P::Conflicted)), DiffChoice::Resolve);
        assert_eq!(choose(&sd(F::Conflicted, P::None)), DiffChoice::Resolve);
        assert_eq!(choose(&sd(F::Conflicted, P::Normal)), DiffChoice::Resolve);
        assert_eq!(choose(&sd(F::Conflicted, P::Conflicted)), DiffChoice::Resolve);

        assert_eq!(choose(&sd(F::Normal, P::Normal)), DiffChoice::NotHandled);
        assert_eq!(choose(&sd(F::Normal, P::None)), DiffChoice::NotHandled);
        assert_eq!(choose(&sd(F::Unversioned, P::None)), DiffChoice::NotHandled);
        assert_eq!(choose(&sd(F::Unversioned, P::Normal)), DiffChoice::NotHandled);
    }

    #[test]
    fn test_lock_does_not_affect_choice() {
        let status = StatusData::normal("a").with_lock(LockStatus::LockedHere);
        assert_eq!(choose(&status), DiffChoice::NotHandled);
    }

    #[test]
    fn test_asset_before_meta() {
        let mut cache = StatusSnapshot::new();
        cache.insert(StatusData::normal("Assets/a.png").with_status(FileStatus::Conflicted));
        cache.insert(StatusData::normal("Assets/a.png.meta").with_status(FileStatus::Modified));

        let target = choose_for_asset("Assets/a.png", &cache, &SelectionConfig::default()).unwrap();
        assert_eq!(target.path, "Assets/a.png");
        assert_eq!(target.choice, DiffChoice::Resolve);
    }

    #[test]
    fn test_falls_through_to_meta() {
        let mut cache = StatusSnapshot::new();
        cache.insert(
            StatusData::normal("Assets/a.png.meta").with_properties(PropertiesStatus::Modified),
        );

        let target = choose_for_asset("Assets/a.png", &cache, &SelectionConfig::default()).unwrap();
        assert_eq!(target.path, "Assets/a.png.meta");
        assert_eq!(target.choice, DiffChoice::Diff);
    }

    #[test]
    fn test_clean_asset_not_handled() {
        let cache = StatusSnapshot::new();
        assert!(choose_for_asset("Assets/a.png", &cache, &SelectionConfig::default()).is_none());
    }
}
