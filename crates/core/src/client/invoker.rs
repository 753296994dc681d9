//! Launching external client programs.

use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::ClientKind;
use crate::config::{ClientConfig, ProgramConfig};
use crate::errors::InvokeError;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// The operation an [`Invocation`] asks the client to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientCommand {
    CheckChanges,
    Diff,
    Resolve,
    Update,
    Commit,
    Add,
    Revert,
    ResolveAll,
    GetLocks,
    ReleaseLocks,
    ShowLog,
    Blame,
    Cleanup,
    RepoBrowser,
    Switch,
}

impl ClientCommand {
    /// Name used as the key of argument templates in the config.
    pub fn name(self) -> &'static str {
        match self {
            Self::CheckChanges => "check_changes",
            Self::Diff => "diff",
            Self::Resolve => "resolve",
            Self::Update => "update",
            Self::Commit => "commit",
            Self::Add => "add",
            Self::Revert => "revert",
            Self::ResolveAll => "resolve_all",
            Self::GetLocks => "get_locks",
            Self::ReleaseLocks => "release_locks",
            Self::ShowLog => "show_log",
            Self::Blame => "blame",
            Self::Cleanup => "cleanup",
            Self::RepoBrowser => "repo_browser",
            Self::Switch => "switch",
        }
    }
}

impl std::fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved request to launch a client program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub client: ClientKind,
    pub command: ClientCommand,
    /// Target paths, with metadata companions already expanded.
    pub paths: Vec<String>,
    pub url: Option<String>,
    /// Block until the program exits.
    pub wait: bool,
}

/// Launches client programs.
pub trait ProcessInvoker: Send + Sync {
    fn launch(&self, invocation: &Invocation) -> Result<(), InvokeError>;
}

// ---------------------------------------------------------------------------
// Command invoker
// ---------------------------------------------------------------------------

/// Launches the program configured for each client, rendering its
/// arguments from the per-command templates.
#[derive(Debug, Clone, Default)]
pub struct CommandInvoker {
    programs: HashMap<ClientKind, ProgramConfig>,
}

impl CommandInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the program used for `kind`.
    pub fn with_program(mut self, kind: ClientKind, program: ProgramConfig) -> Self {
        self.programs.insert(kind, program);
        self
    }

    /// Build an invoker from the `[client]` config section.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut invoker = Self::new();
        for kind in [ClientKind::TortoiseSvn, ClientKind::SnailSvn] {
            if let Some(program) = config.program_for(kind) {
                invoker = invoker.with_program(kind, program.clone());
            }
        }
        invoker
    }

    /// Render the argument list for `invocation` using `program`'s templates.
    pub fn render_args(program: &ProgramConfig, invocation: &Invocation) -> Vec<String> {
        let template = program
            .commands
            .get(invocation.command.name())
            .cloned()
            .unwrap_or_else(|| default_template(invocation));

        let joined = invocation
            .paths
            .join(program.path_separator.as_deref().unwrap_or(" "));
        let first = invocation.paths.first().map(String::as_str).unwrap_or("");
        let url = invocation.url.as_deref().unwrap_or("");

        let mut args = Vec::with_capacity(template.len() + invocation.paths.len());
        for arg in template {
            if arg == "{paths}" && program.path_separator.is_none() {
                args.extend(invocation.paths.iter().cloned());
                continue;
            }
            args.push(
                arg.replace("{paths}", &joined)
                    .replace("{path}", first)
                    .replace("{url}", url),
            );
        }
        args
    }
}

fn default_template(invocation: &Invocation) -> Vec<String> {
    let mut template = vec![invocation.command.name().to_string(), "{paths}".to_string()];
    if invocation.url.is_some() {
        template.push("{url}".to_string());
    }
    template
}

impl ProcessInvoker for CommandInvoker {
    fn launch(&self, invocation: &Invocation) -> Result<(), InvokeError> {
        let program = self
            .programs
            .get(&invocation.client)
            .ok_or(InvokeError::NotConfigured(invocation.client))?;
        let program_name = program.program.display().to_string();
        let args = Self::render_args(program, invocation);

        let mut cmd = Command::new(&program.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!(program = %program_name, ?args, wait = invocation.wait, "launching client program");

        let not_found = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                InvokeError::ProgramNotFound(program_name.clone())
            } else {
                InvokeError::IoError(e)
            }
        };

        if !invocation.wait {
            // Detached: a background thread reaps the child when it exits.
            let mut child = cmd.spawn().map_err(not_found)?;
            let command = invocation.command;
            let reaper = std::thread::Builder::new()
                .name("client-reaper".into())
                .spawn(move || match child.wait() {
                    Ok(status) => debug!(%command, code = ?status.code(), "detached client program exited"),
                    Err(e) => warn!(%command, error = %e, "failed to wait on detached client program"),
                });
            if let Err(e) = reaper {
                warn!(program = %program_name, error = %e, "could not start reaper thread");
            }
            return Ok(());
        }

        let status = cmd.status().map_err(not_found)?;
        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            warn!(program = %program_name, exit_code, "client program failed");
            return Err(InvokeError::Failed {
                program: program_name,
                exit_code,
            });
        }

        info!(program = %program_name, command = %invocation.command, "client program finished");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dry-run invoker
// ---------------------------------------------------------------------------

/// Logs and records invocations instead of launching anything.
#[derive(Debug, Default)]
pub struct LoggingInvoker {
    invocations: Mutex<Vec<Invocation>>,
}

impl LoggingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every invocation received so far, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProcessInvoker for LoggingInvoker {
    fn launch(&self, invocation: &Invocation) -> Result<(), InvokeError> {
        info!(
            client = %invocation.client,
            command = %invocation.command,
            paths = ?invocation.paths,
            url = ?invocation.url,
            wait = invocation.wait,
            "dry run: would launch client"
        );
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(invocation.clone());
        Ok(())
    }
}
