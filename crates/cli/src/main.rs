//! svnctx command-line front-end.
//!
//! Loads the configuration and a status snapshot, selects the configured
//! client and forwards one operation to the dispatcher. All routing
//! decisions live in `svnctx-core`.

mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use svnctx_core::client::{CommandInvoker, LoggingInvoker, ProcessInvoker};
use svnctx_core::lock_batch::LockBatch;
use svnctx_core::{AppConfig, ClientKind, Dispatcher, Platform, Selection, StatusSnapshot};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// svnctx: run SVN client operations on a selection of paths.
#[derive(Parser, Debug)]
#[command(
    name = "svnctx",
    version,
    about = "Route SVN client operations based on cached working-copy status"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to a JSON status snapshot of the working copy.
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// Log the client invocations instead of launching anything.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Override the log level from the config file (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Validate the client against this platform instead of the host.
    #[arg(long, global = true, hide = true, value_enum)]
    platform: Option<PlatformArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check changes, or diff/resolve a single modified or conflicted file.
    CheckChanges {
        paths: Vec<String>,
        /// Check the whole project and nested repositories.
        #[arg(long)]
        all: bool,
    },

    /// Diff or resolve exactly one path.
    DiffResolve { path: String },

    /// Update paths, blocking until the client exits.
    Update {
        paths: Vec<String>,
        #[arg(long)]
        all: bool,
        /// Include metadata companions.
        #[arg(long)]
        include_meta: bool,
        /// Return immediately instead of waiting for the client.
        #[arg(long)]
        no_wait: bool,
    },

    /// Commit the selection.
    Commit {
        paths: Vec<String>,
        #[arg(long)]
        all: bool,
    },

    /// Add the selection with its metadata companions.
    Add { paths: Vec<String> },

    /// Revert the selection.
    Revert {
        paths: Vec<String>,
        #[arg(long)]
        all: bool,
    },

    /// Resolve every conflict in the working copy.
    ResolveAll {
        #[arg(long)]
        wait: bool,
    },

    /// Get locks on the lock-relevant part of the selection.
    GetLocks { paths: Vec<String> },

    /// Release locks held on the selection.
    ReleaseLocks { paths: Vec<String> },

    /// Show the log of a path, or of the whole project.
    Log { path: Option<String> },

    /// Blame a file.
    Blame { path: String },

    /// Clean up the working copy.
    Cleanup {
        #[arg(long)]
        no_wait: bool,
    },

    /// Open the repository browser at a URL.
    RepoBrowser {
        url: String,
        #[arg(long)]
        wait: bool,
    },

    /// Switch a working copy path to a URL.
    Switch {
        local_path: String,
        url: String,
        #[arg(long)]
        wait: bool,
    },

    /// Report whether a client is usable on this platform.
    Supported {
        #[arg(value_enum)]
        client: ClientArg,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./svnctx.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ClientArg {
    None,
    Tortoisesvn,
    Snailsvn,
}

impl From<ClientArg> for ClientKind {
    fn from(arg: ClientArg) -> Self {
        match arg {
            ClientArg::None => ClientKind::None,
            ClientArg::Tortoisesvn => ClientKind::TortoiseSvn,
            ClientArg::Snailsvn => ClientKind::SnailSvn,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlatformArg {
    Windows,
    Macos,
    Linux,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Macos => Platform::MacOs,
            PlatformArg::Linux => Platform::Linux,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { output } = &cli.command {
        return cmd_init(output);
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.log_level));

    let platform = cli.platform.map_or_else(Platform::current, Platform::from);

    match cli.command {
        Commands::Validate => {
            println!("{}", style::success("configuration is valid"));
            if let Some(reason) = svnctx_core::client::is_currently_supported(config.client.kind, platform) {
                println!("{}", style::warn(&reason));
            }
            Ok(())
        }
        Commands::Supported { client } => {
            let kind = ClientKind::from(client);
            match svnctx_core::client::is_currently_supported(kind, platform) {
                None => println!("{}", style::success(&format!("{} is supported on {}", kind, platform))),
                Some(reason) => println!("{}", style::warn(&reason)),
            }
            Ok(())
        }
        command => {
            let dispatcher = build_dispatcher(&config, cli.snapshot.as_deref(), cli.dry_run, platform)?;
            dispatch(&dispatcher, command);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("svnctx").join("config.toml"))
}

/// Load the explicit config, else the per-user one, else defaults.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return AppConfig::load_and_validate(path).context("failed to load configuration file");
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            AppConfig::load_and_validate(&path).context("failed to load configuration file")
        }
        _ => Ok(AppConfig::default()),
    }
}

fn build_dispatcher(
    config: &AppConfig,
    snapshot: Option<&Path>,
    dry_run: bool,
    platform: Platform,
) -> Result<Dispatcher> {
    let cache = match snapshot {
        Some(path) => StatusSnapshot::load_from_file(path).context("failed to load status snapshot")?,
        None => StatusSnapshot::new(),
    }
    .with_meta_suffix(config.selection.meta_suffix.clone())
    .with_working_copy(&config.selection.project_root);

    let invoker: Arc<dyn ProcessInvoker> = if dry_run {
        Arc::new(LoggingInvoker::new())
    } else {
        Arc::new(CommandInvoker::from_config(&config.client))
    };

    let dispatcher = Dispatcher::new(Arc::new(cache), invoker, config.selection.clone())
        .with_platform(platform);

    if let Err(e) = dispatcher.configure(config.client.kind) {
        bail!("{}", e.reason);
    }
    if config.client.kind == ClientKind::None {
        eprintln!("{}", style::dim("no client configured, nothing will be launched"));
    }

    Ok(dispatcher)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn dispatch(dispatcher: &Dispatcher, command: Commands) {
    match command {
        Commands::CheckChanges { all: true, .. } => dispatcher.check_changes_all(),
        Commands::CheckChanges { paths, .. } => {
            dispatcher.check_changes_selected(&Selection::new(paths))
        }
        Commands::DiffResolve { path } => dispatcher.diff_resolve(&Selection::new([path])),
        Commands::Update { all: true, .. } => dispatcher.update_all(),
        Commands::Update {
            paths,
            include_meta,
            no_wait,
            ..
        } => {
            let selection = Selection::new(paths);
            if no_wait {
                dispatcher.update_and_dont_wait(selection.paths(), include_meta);
            } else {
                dispatcher.update(selection.paths(), include_meta);
            }
        }
        Commands::Commit { all: true, .. } => dispatcher.commit_all(),
        Commands::Commit { paths, .. } => dispatcher.commit_selected(&Selection::new(paths)),
        Commands::Add { paths } => dispatcher.add_selected(&Selection::new(paths)),
        Commands::Revert { all: true, .. } => dispatcher.revert_all(),
        Commands::Revert { paths, .. } => dispatcher.revert_selected(&Selection::new(paths)),
        Commands::ResolveAll { wait } => dispatcher.resolve_all(wait),
        Commands::GetLocks { paths } => {
            dispatcher.get_locks_selected(&Selection::new(paths));
        }
        Commands::ReleaseLocks { paths } => {
            // Nothing locked: stay silent.
            if let LockBatch::Filtered(released) =
                dispatcher.release_locks_selected(&Selection::new(paths))
            {
                tracing::debug!(count = released.len(), "release locks dispatched");
            }
        }
        Commands::Log { path: None } => dispatcher.show_log_all(),
        Commands::Log { path: Some(path) } => dispatcher.show_log_selected(&Selection::new([path])),
        Commands::Blame { path } => dispatcher.blame_selected(&Selection::new([path])),
        Commands::Cleanup { no_wait: false } => dispatcher.cleanup(),
        Commands::Cleanup { no_wait: true } => dispatcher.cleanup_and_dont_wait(),
        Commands::RepoBrowser { url, wait } => dispatcher.repo_browser(&url, wait),
        Commands::Switch {
            local_path,
            url,
            wait,
        } => dispatcher.switch(&local_path, &url, wait),
        Commands::Supported { .. } | Commands::Init { .. } | Commands::Validate => {}
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    let default_config = r#"# svnctx configuration

[client]
# none, tortoisesvn or snailsvn
kind = "none"

# [client.tortoisesvn]
# program = "C:/Program Files/TortoiseSVN/bin/TortoiseProc.exe"
# path_separator = "*"
#
# [client.tortoisesvn.commands]
# commit = ["/command:commit", "/path:{paths}"]
# repo_browser = ["/command:repobrowser", "/path:{url}"]

[selection]
project_root = "."
root_alias = "Assets"
meta_suffix = ".meta"

[logging]
log_level = "info"
"#;

    if output.exists() {
        bail!("{} already exists, refusing to overwrite", output.display());
    }

    std::fs::write(output, default_config)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "{}",
        style::success(&format!("wrote default configuration to {}", output.display()))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_all() {
        let cli = Cli::parse_from(["svnctx", "commit", "--all"]);
        assert!(matches!(cli.command, Commands::Commit { all: true, .. }));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "svnctx",
            "get-locks",
            "Assets/a.png",
            "Assets/b.png",
            "--dry-run",
            "--snapshot",
            "status.json",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.snapshot, Some(PathBuf::from("status.json")));
        match cli.command {
            Commands::GetLocks { paths } => assert_eq!(paths.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_client_arg_conversion() {
        assert_eq!(ClientKind::from(ClientArg::Snailsvn), ClientKind::SnailSvn);
        assert_eq!(Platform::from(PlatformArg::Macos), Platform::MacOs);
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svnctx.toml");
        cmd_init(&path).unwrap();
        let config = AppConfig::load_and_validate(&path).unwrap();
        assert_eq!(config.client.kind, ClientKind::None);

        assert!(cmd_init(&path).is_err());
    }

    #[test]
    fn test_build_dispatcher_rejects_unsupported_client() {
        let mut config = AppConfig::default();
        config.client.kind = ClientKind::TortoiseSvn;
        let result = build_dispatcher(&config, None, true, Platform::MacOs);
        assert!(result.is_err());

        let dispatcher = build_dispatcher(&config, None, true, Platform::Windows).unwrap();
        assert_eq!(dispatcher.active_kind(), ClientKind::TortoiseSvn);
    }
}
