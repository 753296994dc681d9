//! [`ClientCapability`] implementation backed by a [`ProcessInvoker`].

use std::sync::Arc;

use tracing::{debug, error};

use super::invoker::{ClientCommand, Invocation, ProcessInvoker};
use super::{ClientCapability, ClientKind};
use crate::config::SelectionConfig;

/// Drives one external client through a process invoker.
///
/// Metadata companions are expanded here: with `include_meta`, every path
/// except the project root is followed by its companion.
pub struct InvokerClient {
    kind: ClientKind,
    invoker: Arc<dyn ProcessInvoker>,
    project_root: String,
    meta_suffix: String,
}

impl InvokerClient {
    pub fn new(kind: ClientKind, invoker: Arc<dyn ProcessInvoker>, selection: &SelectionConfig) -> Self {
        Self {
            kind,
            invoker,
            project_root: selection.project_root.clone(),
            meta_suffix: selection.meta_suffix.clone(),
        }
    }

    /// `paths` with companions interleaved when `include_meta` is set.
    /// Duplicates are dropped, first occurrence wins.
    pub fn context_paths(&self, paths: &[String], include_meta: bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(paths.len() * 2);
        let mut push = |p: String| {
            if !out.contains(&p) {
                out.push(p);
            }
        };

        for path in paths {
            push(path.clone());
            if include_meta && *path != self.project_root && !path.ends_with(&self.meta_suffix) {
                push(format!("{}{}", path, self.meta_suffix));
            }
        }
        out
    }

    fn launch(&self, command: ClientCommand, paths: Vec<String>, url: Option<&str>, wait: bool) {
        let invocation = Invocation {
            client: self.kind,
            command,
            paths,
            url: url.map(String::from),
            wait,
        };
        debug!(client = %self.kind, %command, paths = ?invocation.paths, wait, "invoking client");

        if let Err(e) = self.invoker.launch(&invocation) {
            error!(client = %self.kind, %command, error = %e, "failed to launch client");
        }
    }

    fn launch_paths(&self, command: ClientCommand, paths: &[String], include_meta: bool, wait: bool) {
        let paths = self.context_paths(paths, include_meta);
        self.launch(command, paths, None, wait);
    }
}

impl ClientCapability for InvokerClient {
    fn kind(&self) -> ClientKind {
        self.kind
    }

    fn check_changes(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::CheckChanges, paths, include_meta, wait);
    }

    fn diff_changes(&self, path: &str, wait: bool) {
        self.launch(ClientCommand::Diff, vec![path.to_string()], None, wait);
    }

    fn resolve(&self, path: &str, wait: bool) {
        self.launch(ClientCommand::Resolve, vec![path.to_string()], None, wait);
    }

    fn update(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::Update, paths, include_meta, wait);
    }

    fn commit(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::Commit, paths, include_meta, wait);
    }

    fn add(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::Add, paths, include_meta, wait);
    }

    fn revert(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::Revert, paths, include_meta, wait);
    }

    fn resolve_all(&self, wait: bool) {
        self.launch(ClientCommand::ResolveAll, vec![self.project_root.clone()], None, wait);
    }

    fn get_locks(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::GetLocks, paths, include_meta, wait);
    }

    fn release_locks(&self, paths: &[String], include_meta: bool, wait: bool) {
        self.launch_paths(ClientCommand::ReleaseLocks, paths, include_meta, wait);
    }

    fn show_log(&self, path: Option<&str>, wait: bool) {
        let target = path.unwrap_or(self.project_root.as_str()).to_string();
        self.launch(ClientCommand::ShowLog, vec![target], None, wait);
    }

    fn blame(&self, path: Option<&str>, wait: bool) {
        // Blame needs a file.
        let Some(path) = path else {
            debug!(client = %self.kind, "blame without a path ignored");
            return;
        };
        self.launch(ClientCommand::Blame, vec![path.to_string()], None, wait);
    }

    fn cleanup(&self, wait: bool) {
        self.launch(ClientCommand::Cleanup, vec![self.project_root.clone()], None, wait);
    }

    fn repo_browser(&self, url: &str, wait: bool) {
        self.launch(ClientCommand::RepoBrowser, Vec::new(), Some(url), wait);
    }

    fn switch(&self, local_path: &str, url: &str, wait: bool) {
        self.launch(ClientCommand::Switch, vec![local_path.to_string()], Some(url), wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::invoker::LoggingInvoker;
    use crate::errors::InvokeError;

    fn client() -> (InvokerClient, Arc<LoggingInvoker>) {
        let invoker = Arc::new(LoggingInvoker::new());
        let client = InvokerClient::new(
            ClientKind::TortoiseSvn,
            invoker.clone(),
            &SelectionConfig::default(),
        );
        (client, invoker)
    }

    fn paths(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_context_paths_meta_expansion() {
        let (client, _) = client();
        assert_eq!(
            client.context_paths(&paths(&["Assets/a.png", "Assets/b.png"]), true),
            paths(&["Assets/a.png", "Assets/a.png.meta", "Assets/b.png", "Assets/b.png.meta"])
        );
        assert_eq!(
            client.context_paths(&paths(&["Assets/a.png"]), false),
            paths(&["Assets/a.png"])
        );
    }

    #[test]
    fn test_context_paths_skips_root_and_duplicates() {
        let (client, _) = client();
        assert_eq!(
            client.context_paths(&paths(&[".", "Assets/a.png", "Assets/a.png.meta"]), true),
            paths(&[".", "Assets/a.png", "Assets/a.png.meta"])
        );
    }

    #[test]
    fn test_commit_invocation() {
        let (client, invoker) = client();
        client.commit(&paths(&["Assets/a.png"]), true, false);

        let recorded = invoker.invocations();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].client, ClientKind::TortoiseSvn);
        assert_eq!(recorded[0].command, ClientCommand::Commit);
        assert_eq!(recorded[0].paths, paths(&["Assets/a.png", "Assets/a.png.meta"]));
        assert!(!recorded[0].wait);
    }

    #[test]
    fn test_url_operations() {
        let (client, invoker) = client();
        client.repo_browser("svn://host/repo", false);
        client.switch(".", "svn://host/repo/branches/x", true);

        let recorded = invoker.invocations();
        assert_eq!(recorded[0].command, ClientCommand::RepoBrowser);
        assert!(recorded[0].paths.is_empty());
        assert_eq!(recorded[0].url.as_deref(), Some("svn://host/repo"));
        assert_eq!(recorded[1].paths, paths(&["."]));
        assert!(recorded[1].wait);
    }

    #[test]
    fn test_show_log_defaults_to_root_and_blame_needs_path() {
        let (client, invoker) = client();
        client.show_log(None, false);
        client.blame(None, false);

        let recorded = invoker.invocations();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].command, ClientCommand::ShowLog);
        assert_eq!(recorded[0].paths, paths(&["."]));
    }

    struct FailingInvoker;

    impl ProcessInvoker for FailingInvoker {
        fn launch(&self, invocation: &Invocation) -> Result<(), InvokeError> {
            Err(InvokeError::NotConfigured(invocation.client))
        }
    }

    #[test]
    fn test_launch_failure_is_swallowed() {
        let client = InvokerClient::new(
            ClientKind::SnailSvn,
            Arc::new(FailingInvoker),
            &SelectionConfig::default(),
        );
        // Must not panic or propagate.
        client.cleanup(true);
    }
}
