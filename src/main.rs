use anyhow::Result;
use clap::Parser;
use git_autopush::cli::{Cli, Commands};
use git_autopush::commands::dispatch;
use git_autopush::core::{git, runtime::capture_local_offset};
use git_autopush::logging::init::{init_tracing, init_tracing_with_file};

fn main() -> Result<()> {
    // Before any thread exists (the file logger spawns one).
    capture_local_offset();

    let cli = Cli::parse();

    // The polling loop also logs to a file under the git dir
    match &cli.command {
        Commands::Run { .. } => {
            let root = git::repo_root()?;
            let log_dir = git::ensure_autopush_dir(&git::git_dir(&root)?)?;
            init_tracing_with_file(&log_dir, cli.verbose)?;
        }
        _ => {
            init_tracing(cli.verbose)?;
        }
    }

    dispatch(&cli)
}
