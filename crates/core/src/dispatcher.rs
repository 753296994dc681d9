//! Routing of user-facing operations to the active client.
//!
//! The [`Dispatcher`] owns the active [`ClientCapability`] (or none) and runs
//! each request through the selection, diff/resolve and lock resolvers before
//! forwarding it. With no active client every operation is a silent no-op.
//!
//! Operations that change the working copy (update, revert-all, cleanup)
//! block until the client exits by default: applying changes while the
//! caller is still generating files in the same tree is unsafe.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, instrument, warn};

use crate::client::{self, ClientCapability, ClientKind, Platform, ProcessInvoker};
use crate::config::SelectionConfig;
use crate::diff_resolve;
use crate::errors::ConfigurationError;
use crate::lock_batch::{self, LockBatch};
use crate::selection::{self, ChangesRoute, Selection, Target};
use crate::status_cache::StatusCache;

/// Façade over the active client integration.
pub struct Dispatcher {
    active: RwLock<Option<Arc<dyn ClientCapability>>>,
    cache: Arc<dyn StatusCache>,
    invoker: Arc<dyn ProcessInvoker>,
    selection: SelectionConfig,
    platform: Platform,
}

impl Dispatcher {
    /// Create a dispatcher with no active client.
    pub fn new(
        cache: Arc<dyn StatusCache>,
        invoker: Arc<dyn ProcessInvoker>,
        selection: SelectionConfig,
    ) -> Self {
        Self {
            active: RwLock::new(None),
            cache,
            invoker,
            selection,
            platform: Platform::current(),
        }
    }

    /// Override the host platform used to validate client choices.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn selection_config(&self) -> &SelectionConfig {
        &self.selection
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Select the client used for every following operation.
    ///
    /// An unsupported choice leaves no client active and returns the reason.
    pub fn configure(&self, kind: ClientKind) -> Result<(), ConfigurationError> {
        match client::create_client(kind, self.platform, self.invoker.clone(), &self.selection) {
            Ok(created) => {
                self.set_client(created);
                Ok(())
            }
            Err(e) => {
                self.set_client(None);
                Err(e)
            }
        }
    }

    /// Replace the active client. The swap is atomic: an operation in flight
    /// keeps the client it started with.
    pub fn set_client(&self, client: Option<Arc<dyn ClientCapability>>) {
        let kind = client.as_ref().map_or(ClientKind::None, |c| c.kind());
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *active = client;
        info!(client = %kind, "active client changed");
    }

    /// Kind of the active client, `ClientKind::None` if there is none.
    pub fn active_kind(&self) -> ClientKind {
        self.client().map_or(ClientKind::None, |c| c.kind())
    }

    /// Reason `kind` cannot be used here, without touching the active client.
    pub fn is_currently_supported(&self, kind: ClientKind) -> Option<String> {
        client::is_currently_supported(kind, self.platform)
    }

    fn client(&self) -> Option<Arc<dyn ClientCapability>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `f` on the active client, or log and do nothing.
    fn with_client<F>(&self, operation: &'static str, f: F)
    where
        F: FnOnce(&dyn ClientCapability),
    {
        match self.client() {
            Some(client) => f(client.as_ref()),
            None => debug!(operation, "no active client, skipping"),
        }
    }

    fn all_roots(&self) -> Vec<String> {
        selection::all_roots(self.cache.as_ref(), &self.selection)
    }

    // -----------------------------------------------------------------------
    // Check changes / diff / resolve
    // -----------------------------------------------------------------------

    /// Check changes across the project and every nested repository.
    pub fn check_changes_all(&self) {
        let roots = self.all_roots();
        self.with_client("check_changes_all", |c| c.check_changes(&roots, false, false));
    }

    /// Check changes on the selection. A single file gets a diff or a
    /// resolve when its status (or its companion's) calls for one.
    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub fn check_changes_selected(&self, selection: &Selection) {
        let Some(client) = self.client() else {
            debug!("no active client, skipping");
            return;
        };

        match selection::resolve_check_changes(selection, self.cache.as_ref()) {
            ChangesRoute::Nothing => debug!("empty selection"),
            ChangesRoute::Batch(paths) => client.check_changes(&paths, true, false),
            ChangesRoute::Single(path) => {
                match diff_resolve::choose_for_asset(&path, self.cache.as_ref(), &self.selection) {
                    Some(target) => target.apply(client.as_ref(), false),
                    None => client.check_changes(selection.paths(), true, false),
                }
            }
        }
    }

    /// Diff or resolve a single selected entry. Ignored for any other
    /// selection size.
    pub fn diff_resolve(&self, selection: &Selection) {
        if selection.single().is_none() {
            debug!(count = selection.len(), "diff/resolve needs exactly one path");
            return;
        }
        self.check_changes_selected(selection);
    }

    pub fn check_changes(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("check_changes", |c| c.check_changes(paths, include_meta, wait));
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Update the project and every nested repository, blocking until done.
    pub fn update_all(&self) {
        let roots = self.all_roots();
        self.with_client("update_all", |c| c.update(&roots, false, true));
    }

    /// Update `paths`, blocking until done.
    pub fn update(&self, paths: &[String], include_meta: bool) {
        self.with_client("update", |c| c.update(paths, include_meta, true));
    }

    /// Update without waiting. The caller must not be writing into the
    /// working copy while the client runs.
    pub fn update_and_dont_wait(&self, paths: &[String], include_meta: bool) {
        warn!(count = paths.len(), "updating without waiting for the client");
        self.with_client("update", |c| c.update(paths, include_meta, false));
    }

    // -----------------------------------------------------------------------
    // Commit / add / revert
    // -----------------------------------------------------------------------

    pub fn commit_all(&self) {
        let roots = self.all_roots();
        self.with_client("commit_all", |c| c.commit(&roots, false, false));
    }

    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub fn commit_selected(&self, selection: &Selection) {
        if selection.is_empty() {
            debug!("empty selection");
            return;
        }
        match selection::resolve_scoped(selection, self.cache.as_ref(), &self.selection) {
            Target::AllRoots => self.commit_all(),
            Target::Paths {
                paths,
                include_meta,
            } => self.with_client("commit", |c| c.commit(&paths, include_meta, false)),
        }
    }

    pub fn commit(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("commit", |c| c.commit(paths, include_meta, wait));
    }

    /// Add the selection together with its companions.
    pub fn add_selected(&self, selection: &Selection) {
        if selection.is_empty() {
            debug!("empty selection");
            return;
        }
        self.with_client("add", |c| c.add(selection.paths(), true, false));
    }

    pub fn add(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("add", |c| c.add(paths, include_meta, wait));
    }

    /// Revert the project and every nested repository, blocking until done.
    pub fn revert_all(&self) {
        let roots = self.all_roots();
        self.with_client("revert_all", |c| c.revert(&roots, false, true));
    }

    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub fn revert_selected(&self, selection: &Selection) {
        if selection.is_empty() {
            debug!("empty selection");
            return;
        }
        match selection::resolve_scoped(selection, self.cache.as_ref(), &self.selection) {
            Target::AllRoots => self.revert_all(),
            Target::Paths {
                paths,
                include_meta: false,
            } => self.with_client("revert", |c| c.revert(&paths, false, false)),
            Target::Paths {
                paths,
                include_meta: true,
            } => self.with_client("revert", |c| c.revert(&paths, true, true)),
        }
    }

    pub fn revert(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("revert", |c| c.revert(paths, include_meta, wait));
    }

    pub fn resolve_all(&self, wait: bool) {
        self.with_client("resolve_all", |c| c.resolve_all(wait));
    }

    // -----------------------------------------------------------------------
    // Locks
    // -----------------------------------------------------------------------

    /// Get locks on the lock-relevant part of the selection. When nothing in
    /// the selection is lock-relevant, the raw selection is sent with its
    /// companions.
    ///
    /// Returns the partition so the caller can stay silent on
    /// [`LockBatch::NothingToDo`].
    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub fn get_locks_selected(&self, selection: &Selection) -> LockBatch {
        self.dispatch_lock_batch(selection, false, |c, paths, meta| {
            c.get_locks(paths, meta, false)
        })
    }

    pub fn get_locks(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("get_locks", |c| c.get_locks(paths, include_meta, wait));
    }

    /// Release the locks held on the selection. Nothing happens when no
    /// selected entry is locked.
    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub fn release_locks_selected(&self, selection: &Selection) -> LockBatch {
        self.dispatch_lock_batch(selection, true, |c, paths, meta| {
            c.release_locks(paths, meta, false)
        })
    }

    pub fn release_locks(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.with_client("release_locks", |c| c.release_locks(paths, include_meta, wait));
    }

    fn dispatch_lock_batch<F>(&self, selection: &Selection, only_locked: bool, op: F) -> LockBatch
    where
        F: FnOnce(&dyn ClientCapability, &[String], bool),
    {
        let batch = lock_batch::partition(selection, self.cache.as_ref(), only_locked);
        let paths = batch.paths();
        if !paths.is_empty() {
            let include_meta = batch.include_meta();
            self.with_client("lock_batch", |c| op(c, paths, include_meta));
        } else if !batch.is_handled() {
            debug!(only_locked, "no lock-relevant paths, nothing to do");
        }
        batch
    }

    // -----------------------------------------------------------------------
    // Log / blame
    // -----------------------------------------------------------------------

    pub fn show_log_all(&self) {
        let root = self.selection.project_root.clone();
        self.with_client("show_log", |c| c.show_log(Some(&root), false));
    }

    /// Show the log of the first selected path, or of the project when
    /// nothing is selected.
    pub fn show_log_selected(&self, selection: &Selection) {
        let target = selection.first().unwrap_or(self.selection.project_root.as_str());
        self.with_client("show_log", |c| c.show_log(Some(target), false));
    }

    pub fn show_log(&self, path: Option<&str>, wait: bool) {
        self.with_client("show_log", |c| c.show_log(path, wait));
    }

    pub fn blame_selected(&self, selection: &Selection) {
        self.with_client("blame", |c| c.blame(selection.first(), false));
    }

    pub fn blame(&self, path: Option<&str>, wait: bool) {
        self.with_client("blame", |c| c.blame(path, wait));
    }

    // -----------------------------------------------------------------------
    // Working copy & repository
    // -----------------------------------------------------------------------

    /// Clean up the working copy, blocking until done.
    pub fn cleanup(&self) {
        self.with_client("cleanup", |c| c.cleanup(true));
    }

    pub fn cleanup_and_dont_wait(&self) {
        self.with_client("cleanup", |c| c.cleanup(false));
    }

    /// Open the repository browser at `url`.
    pub fn repo_browser(&self, url: &str, wait: bool) {
        self.with_client("repo_browser", |c| c.repo_browser(url, wait));
    }

    /// Open the switch dialog for `local_path`, targeting `url`.
    pub fn switch(&self, local_path: &str, url: &str, wait: bool) {
        self.with_client("switch", |c| c.switch(local_path, url, wait));
    }
}
