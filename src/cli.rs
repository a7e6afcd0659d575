use clap::{ArgAction, Args, Parser, Subcommand};

/// git-autopush command-line interface
#[derive(Parser, Debug, Clone)]
#[command(name = "git-autopush", version, about = "Periodically commit and push working tree changes", long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for values normally read from `autopush.*` git config.
#[derive(Args, Debug, Clone, Default)]
pub struct LoopArgs {
    /// Remote branch to push to (defaults to autopush.branch, then "main")
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Remote to push to (defaults to autopush.remote, then "origin")
    #[arg(long, value_name = "REMOTE")]
    pub remote: Option<String>,

    /// Seconds between status checks (defaults to autopush.interval-secs, then 60)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Poll for changes and push them until interrupted
    Run {
        #[command(flatten)]
        args: LoopArgs,
    },

    /// Check once, commit and push if dirty, then exit
    Once {
        #[command(flatten)]
        args: LoopArgs,
    },

    /// Exit 0 if a loop is running for this repository, non-zero otherwise
    Status,

    /// View loop logs
    Logs {
        /// Follow log output (like tail -f)
        #[arg(short, long)]
        follow: bool,

        /// Number of lines to show (default: 100)
        #[arg(short = 'n', long, default_value = "100")]
        lines: usize,
    },
}
