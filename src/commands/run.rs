use anyhow::{Context, Result};
use tracing::info;

use super::{Command, loop_config};
use crate::{
    app::context::AppContext,
    cli::LoopArgs,
    core::runtime::{AutoPushLoop, lock::acquire_lock},
    logging::init::flush_logs,
};

pub struct RunCommand<'a> {
    pub args: &'a LoopArgs,
}

impl Command for RunCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let _guard = acquire_lock(&ctx.git_dir)?;
        let autopush = AutoPushLoop::new(&ctx.repo_root, loop_config(ctx, self.args));

        // Single-threaded: ticks run strictly one after another.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;
        let result = rt.block_on(async {
            // Listeners are registered here, before the first tick, so a
            // signal during that tick is queued rather than fatal.
            let shutdown = shutdown_signal()?;
            autopush.run_until(shutdown).await;
            Ok::<(), anyhow::Error>(())
        });

        flush_logs();
        result
    }
}

/// Register SIGINT/SIGTERM listeners and return a future that resolves on
/// either. Must be called inside the runtime.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!(event = "shutdown_signal", signal = "SIGINT"),
            _ = terminate.recv() => info!(event = "shutdown_signal", signal = "SIGTERM"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
}
