mod cmd;
mod hook;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, pre_compact::PreCompactArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "recall",
    about = "Session snapshot hooks — save agent session state before compaction, recover it after",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .recall/ or .git/)
    #[arg(long, global = true, env = "RECALL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hook: save a session snapshot before context compaction
    PreCompact(PreCompactArgs),

    /// Hook: print the recovery report after context compaction
    PostCompact,

    /// Hook: print the recovery report and project reminders at session start
    SessionStart,

    /// List saved snapshots, newest first
    List,

    /// Print a snapshot as JSON (default: the latest)
    Show {
        /// Snapshot file name inside the snapshot directory
        name: Option<String>,
    },

    /// Write a default config and create the snapshot directory
    Init,

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // stdout carries the report the host reads; logs go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::PreCompact(args) => {
            hook::run("pre-compact", || cmd::pre_compact::run(&root, args, cli.json))
        }
        Commands::PostCompact => {
            hook::run("post-compact", || cmd::post_compact::run(&root, cli.json))
        }
        Commands::SessionStart => {
            hook::run("session-start", || cmd::session_start::run(&root, cli.json))
        }
        Commands::List => cmd::list::run(&root, cli.json),
        Commands::Show { name } => cmd::show::run(&root, name.as_deref()),
        Commands::Init => cmd::init::run(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
