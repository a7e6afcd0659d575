use anyhow::Result;

use super::{Command, loop_config};
use crate::{
    app::context::AppContext,
    cli::LoopArgs,
    core::runtime::{AutoPushLoop, TickOutcome},
};

pub struct OnceCommand<'a> {
    pub args: &'a LoopArgs,
}

impl Command for OnceCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let autopush = AutoPushLoop::new(&ctx.repo_root, loop_config(ctx, self.args));
        match autopush.tick() {
            TickOutcome::Pushed { message } => println!("pushed: {message}"),
            TickOutcome::NoChanges => println!("no changes"),
        }
        Ok(())
    }
}
