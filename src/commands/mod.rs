use anyhow::Result;

use crate::{
    app::context::AppContext,
    cli::{Cli, Commands, LoopArgs},
    config::AutopushConfig,
};

pub mod logs;
pub mod once;
pub mod run;
pub mod status;

/// Unified interface implemented by each subcommand handler.
pub trait Command {
    /// Execute the subcommand.
    ///
    /// # Errors
    /// Returns an error if the command fails.
    fn run(&self, ctx: &AppContext) -> Result<()>;
}

/// Central dispatcher: routes parsed CLI to subcommand handlers.
///
/// # Errors
/// Returns an error if the invoked subcommand fails.
pub fn dispatch(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_repo(cli.verbose)?;

    match &cli.command {
        Commands::Run { args } => run::RunCommand { args }.run(&ctx),
        Commands::Once { args } => once::OnceCommand { args }.run(&ctx),
        Commands::Status => status::StatusCommand.run(&ctx),
        Commands::Logs { follow, lines } => {
            let cmd = logs::LogsCommand {
                follow: *follow,
                lines: *lines,
            };
            cmd.run(&ctx)
        }
    }
}

/// Git config values with command-line overrides applied.
fn loop_config(ctx: &AppContext, args: &LoopArgs) -> AutopushConfig {
    ctx.cfg.clone().with_overrides(
        args.branch.as_deref(),
        args.remote.as_deref(),
        args.interval_secs,
    )
}
