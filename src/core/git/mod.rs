pub mod ops;
pub mod repo;
pub mod runner;

pub use ops::{GitCli, command_line};
pub use repo::{autopush_dir, ensure_autopush_dir, git_dir, repo_root};
pub use runner::{CommandError, CommandOutput, CommandRunner, ProcessRunner};
