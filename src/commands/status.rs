use anyhow::Result;

use super::Command;
use crate::app::context::AppContext;

pub struct StatusCommand;

impl Command for StatusCommand {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let running = crate::core::runtime::lock::is_running(&ctx.git_dir)?;
        if running {
            println!("running");
            std::process::exit(0);
        } else {
            println!("stopped");
            std::process::exit(1);
        }
    }
}
