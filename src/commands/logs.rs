use anyhow::{Context, Result};

use super::Command;
use crate::app::context::AppContext;

pub struct LogsCommand {
    pub follow: bool,
    pub lines: usize,
}

impl Command for LogsCommand {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;
        rt.block_on(crate::logging::view::show_logs(
            &ctx.runtime_dir(),
            self.follow,
            self.lines,
        ))
    }
}
