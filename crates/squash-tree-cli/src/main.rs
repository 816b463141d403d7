mod cmd_add_metadata;
mod cmd_init;
mod cmd_show;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "git-squash-tree",
    bin_name = "git squash-tree",
    version,
    about = "Show the squash tree recorded for a commit",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
    /// Commit to show (hash or any ref, e.g. HEAD)
    commit: Option<String>,
    /// Include base, strategy and commit messages
    #[arg(long)]
    details: bool,
    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Install squash-tree git hooks in this repo (or globally)
    Init {
        /// Install for every repo via core.hooksPath
        #[arg(long)]
        global: bool,
    },
    /// Record a squash: ROOT replaces CHILDREN, built on BASE
    AddMetadata {
        /// Squash commit (hash or ref)
        #[arg(long)]
        root: String,
        /// Base commit (hash or ref)
        #[arg(long)]
        base: String,
        /// Comma-separated child commits, in squash order
        #[arg(long, value_delimiter = ',', required = true)]
        children: Vec<String>,
        /// How the squash was produced (auto, manual, ...)
        #[arg(long, default_value = "auto")]
        strategy: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = std::env::current_dir()?;

    match cli.cmd {
        Some(Command::Init { global }) => cmd_init::execute(&cwd, global),
        Some(Command::AddMetadata {
            root,
            base,
            children,
            strategy,
        }) => cmd_add_metadata::execute(&cwd, &root, &base, &children, &strategy),
        None => match cli.commit {
            Some(commit) => cmd_show::execute(&cwd, &commit, cli.details),
            None => anyhow::bail!("missing <COMMIT>; see `git squash-tree --help`"),
        },
    }
}
