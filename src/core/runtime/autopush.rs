use std::path::PathBuf;

use tracing::{info, warn};

use super::clock::{Clock, SystemClock, commit_message};
use crate::config::AutopushConfig;
use crate::core::git::{CommandError, CommandOutput, CommandRunner, GitCli, ProcessRunner};

/// Result of one status/commit/push iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Working tree was clean; nothing ran besides the status query.
    NoChanges,
    /// Changes were staged, committed with `message` and pushed.
    Pushed { message: String },
}

/// True iff the trimmed status output is non-empty.
#[must_use]
pub fn has_changes(status: &str) -> bool {
    !status.trim().is_empty()
}

/// Polling loop that commits and pushes every change it finds.
///
/// Command failures never stop the loop: each external command runs
/// regardless of how the previous one exited, and failures only show up
/// as `warn` events.
pub struct AutoPushLoop<R = ProcessRunner, C = SystemClock> {
    git: GitCli<R>,
    clock: C,
    config: AutopushConfig,
}

impl AutoPushLoop {
    pub fn new(workdir: impl Into<PathBuf>, config: AutopushConfig) -> Self {
        Self::with_parts(GitCli::new(workdir), SystemClock, config)
    }
}

impl<R: CommandRunner, C: Clock> AutoPushLoop<R, C> {
    pub const fn with_parts(git: GitCli<R>, clock: C, config: AutopushConfig) -> Self {
        Self { git, clock, config }
    }

    pub const fn config(&self) -> &AutopushConfig {
        &self.config
    }

    pub const fn git(&self) -> &GitCli<R> {
        &self.git
    }

    /// Trimmed `git status --porcelain` output. A failing or unspawnable
    /// status command reads as a clean tree.
    pub fn check_status(&self) -> String {
        observe("git status --porcelain", self.git.status_porcelain())
            .map(|out| out.stdout.trim().to_string())
            .unwrap_or_default()
    }

    /// Stage everything, commit with a timestamped message and push.
    /// Returns the commit message that was used.
    pub fn commit_and_push(&self) -> String {
        observe("git add .", self.git.add_all());

        // Timestamp taken right before the commit, not at tick start.
        let message = commit_message(self.clock.now());
        observe("git commit", self.git.commit(&message));

        let push = format!("git push {} {}", self.config.remote, self.config.branch);
        observe(&push, self.git.push(&self.config.remote, &self.config.branch));

        message
    }

    /// Run one iteration without sleeping.
    pub fn tick(&self) -> TickOutcome {
        let status = self.check_status();
        if has_changes(&status) {
            info!(
                event = "changes_detected",
                remote = %self.config.remote,
                branch = %self.config.branch,
                "changes detected, pushing to {}/{}",
                self.config.remote,
                self.config.branch
            );
            let message = self.commit_and_push();
            info!(event = "push_complete", message = %message, "push complete");
            TickOutcome::Pushed { message }
        } else {
            info!(event = "idle", "no changes, waiting");
            TickOutcome::NoChanges
        }
    }

    /// Tick, sleep for the configured interval, repeat until `shutdown`
    /// completes. A tick in progress is never interrupted.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            event = "loop_start",
            path = %self.git.workdir().display(),
            interval_secs = self.config.interval.as_secs(),
            "polling for changes"
        );
        loop {
            self.tick();
            tokio::select! {
                () = &mut shutdown => {
                    info!(event = "loop_stop", "shutdown requested, stopping");
                    break;
                }
                () = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }
}

// Log a command failure and hand back whatever output exists.
fn observe(
    command: &str,
    result: Result<CommandOutput, CommandError>,
) -> Option<CommandOutput> {
    match result {
        Ok(out) => {
            if let Some(err) = out.failure(command) {
                warn!(event = "command_failed", code = ?out.code, error = %err);
            }
            Some(out)
        }
        Err(err) => {
            warn!(event = "command_spawn_failed", error = %err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::VecDeque,
        io,
        path::Path,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use time::{OffsetDateTime, macros::datetime};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Call {
        args: Vec<String>,
        at: tokio::time::Instant,
    }

    /// Scripted `git`: status answers come from a queue (clean once drained),
    /// subcommands listed in `failing` exit 1.
    #[derive(Default)]
    struct FakeGit {
        statuses: RefCell<VecDeque<io::Result<CommandOutput>>>,
        failing: Vec<&'static str>,
        calls: RefCell<Vec<Call>>,
    }

    impl FakeGit {
        fn with_statuses(statuses: Vec<io::Result<CommandOutput>>) -> Self {
            Self {
                statuses: RefCell::new(statuses.into()),
                ..Self::default()
            }
        }

        fn args(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|c| c.args.clone()).collect()
        }

        fn status_times(&self) -> Vec<tokio::time::Instant> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.args[0] == "status")
                .map(|c| c.at)
                .collect()
        }
    }

    impl CommandRunner for FakeGit {
        fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> io::Result<CommandOutput> {
            assert_eq!(program, "git");
            self.calls.borrow_mut().push(Call {
                args: args.iter().map(ToString::to_string).collect(),
                at: tokio::time::Instant::now(),
            });
            if args[0] == "status" {
                return self
                    .statuses
                    .borrow_mut()
                    .pop_front()
                    .unwrap_or_else(|| Ok(ok("")));
            }
            if self.failing.iter().any(|f| *f == args[0]) {
                return Ok(CommandOutput {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: format!("fatal: {} failed\n", args[0]),
                });
            }
            Ok(ok(""))
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    /// Wall clock driven by tokio's (pausable) clock.
    struct TokioClock {
        base: OffsetDateTime,
        start: tokio::time::Instant,
    }

    impl Clock for TokioClock {
        fn now(&self) -> OffsetDateTime {
            self.base + self.start.elapsed()
        }
    }

    fn fixed_loop(git: FakeGit) -> AutoPushLoop<FakeGit, FixedClock> {
        AutoPushLoop::with_parts(
            GitCli::with_runner("/tmp/repo", git),
            FixedClock(datetime!(2024-05-06 07:08:09 UTC)),
            AutopushConfig::default(),
        )
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    /// Shared buffer that a fmt subscriber writes log lines into.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer poisoned")).into_owned()
        }
    }

    fn tick_with_logs(lp: &AutoPushLoop<FakeGit, FixedClock>) -> (TickOutcome, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let outcome = tracing::subscriber::with_default(subscriber, || lp.tick());
        (outcome, buffer.contents())
    }

    #[test]
    fn has_changes_ignores_whitespace() {
        assert!(!has_changes(""));
        assert!(!has_changes("  \n\t\n"));
        assert!(has_changes(" M file.txt\n"));
        assert!(has_changes("?? new.rs"));
    }

    #[test]
    fn clean_tree_runs_only_status() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(ok(""))]));
        assert_eq!(lp.tick(), TickOutcome::NoChanges);
        assert_eq!(lp.git().runner().args(), vec![strings(&["status", "--porcelain"])]);
    }

    #[test]
    fn whitespace_status_counts_as_clean() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(ok("   \n\n"))]));
        assert_eq!(lp.tick(), TickOutcome::NoChanges);
        assert_eq!(lp.git().runner().args().len(), 1);
    }

    #[test]
    fn dirty_tree_stages_commits_and_pushes_in_order() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(ok(" M file.txt\n"))]));
        assert_eq!(
            lp.tick(),
            TickOutcome::Pushed {
                message: "Auto-commit: 2024-05-06 07:08:09".to_string()
            }
        );
        assert_eq!(
            lp.git().runner().args(),
            vec![
                strings(&["status", "--porcelain"]),
                strings(&["add", "."]),
                strings(&["commit", "-m", "Auto-commit: 2024-05-06 07:08:09"]),
                strings(&["push", "origin", "main"]),
            ]
        );
    }

    #[test]
    fn failing_status_is_treated_as_clean() {
        let failed = CommandOutput {
            code: Some(128),
            stdout: String::new(),
            stderr: "fatal: not a git repository\n".to_string(),
        };
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(failed)]));
        assert_eq!(lp.tick(), TickOutcome::NoChanges);
        assert_eq!(lp.git().runner().args().len(), 1);
    }

    #[test]
    fn missing_git_is_treated_as_clean() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Err(io::Error::new(
            io::ErrorKind::NotFound,
            "git not found",
        ))]));
        assert_eq!(lp.tick(), TickOutcome::NoChanges);
    }

    #[test]
    fn failed_steps_do_not_gate_later_steps() {
        let git = FakeGit {
            failing: vec!["add", "commit", "push"],
            ..FakeGit::with_statuses(vec![Ok(ok("?? new.txt\n"))])
        };
        let lp = fixed_loop(git);
        assert!(matches!(lp.tick(), TickOutcome::Pushed { .. }));

        let subcommands: Vec<String> = lp
            .git()
            .runner()
            .args()
            .into_iter()
            .map(|a| a[0].clone())
            .collect();
        assert_eq!(subcommands, strings(&["status", "add", "commit", "push"]));
    }

    #[test]
    fn push_targets_configured_branch_only() {
        let cfg = AutopushConfig {
            branch: "release".to_string(),
            ..AutopushConfig::default()
        };
        let lp = AutoPushLoop::with_parts(
            GitCli::with_runner(
                "/tmp/repo",
                FakeGit::with_statuses(vec![Ok(ok(" D gone.txt\n"))]),
            ),
            FixedClock(datetime!(2024-05-06 07:08:09 UTC)),
            cfg,
        );
        lp.tick();

        let args = lp.git().runner().args();
        assert_eq!(args.last(), Some(&strings(&["push", "origin", "release"])));
        // No branch lookup is ever performed.
        assert!(args.iter().all(|a| a[0] != "rev-parse" && a[0] != "branch"));
    }

    #[tokio::test(start_paused = true)]
    async fn status_checks_are_one_interval_apart() {
        let lp = fixed_loop(FakeGit::default());

        lp.run_until(tokio::time::sleep(Duration::from_secs(150)))
            .await;

        let times = lp.git().runner().status_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(60));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn configured_interval_is_honored() {
        let cfg = AutopushConfig {
            interval: Duration::from_secs(5),
            ..AutopushConfig::default()
        };
        let lp = AutoPushLoop::with_parts(
            GitCli::with_runner("/tmp/repo", FakeGit::default()),
            FixedClock(datetime!(2024-05-06 07:08:09 UTC)),
            cfg,
        );

        lp.run_until(tokio::time::sleep(Duration::from_secs(12)))
            .await;

        assert_eq!(lp.git().runner().status_times().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_timestamp_is_taken_at_commit_time() {
        let git = FakeGit::with_statuses(vec![
            Ok(ok("")),
            Ok(ok(" M a.txt\n")),
            Ok(ok("")),
            Ok(ok("?? b.txt\n")),
        ]);
        let lp = AutoPushLoop::with_parts(
            GitCli::with_runner("/tmp/repo", git),
            TokioClock {
                base: datetime!(2024-05-06 07:00:00 UTC),
                start: tokio::time::Instant::now(),
            },
            AutopushConfig::default(),
        );

        lp.run_until(tokio::time::sleep(Duration::from_secs(200)))
            .await;

        let commits: Vec<String> = lp
            .git()
            .runner()
            .args()
            .into_iter()
            .filter(|a| a[0] == "commit")
            .map(|a| a[2].clone())
            .collect();
        assert_eq!(
            commits,
            strings(&[
                "Auto-commit: 2024-05-06 07:01:00",
                "Auto-commit: 2024-05-06 07:03:00",
            ])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_going_after_failures() {
        let git = FakeGit {
            failing: vec!["push"],
            ..FakeGit::with_statuses(vec![
                Ok(ok(" M a.txt\n")),
                Ok(ok(" M a.txt\n")),
            ])
        };
        let lp = fixed_loop(git);

        lp.run_until(tokio::time::sleep(Duration::from_secs(130)))
            .await;

        let pushes = lp
            .git()
            .runner()
            .args()
            .iter()
            .filter(|a| a[0] == "push")
            .count();
        assert_eq!(pushes, 2);
        assert_eq!(lp.git().runner().status_times().len(), 3);
    }

    #[test]
    fn clean_tick_reports_no_changes() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(ok("\n"))]));
        let (outcome, logs) = tick_with_logs(&lp);

        assert_eq!(outcome, TickOutcome::NoChanges);
        assert!(logs.contains("no changes, waiting"), "logs: {logs}");
        assert!(!logs.contains("changes detected"), "logs: {logs}");
        assert!(!logs.contains("push complete"), "logs: {logs}");
    }

    #[test]
    fn dirty_tick_reports_detection_then_completion() {
        let lp = fixed_loop(FakeGit::with_statuses(vec![Ok(ok(" M file.txt\n"))]));
        let (outcome, logs) = tick_with_logs(&lp);

        assert!(matches!(outcome, TickOutcome::Pushed { .. }));
        let detected = logs
            .find("changes detected, pushing to origin/main")
            .unwrap_or_else(|| panic!("missing detection line: {logs}"));
        let complete = logs
            .find("push complete")
            .unwrap_or_else(|| panic!("missing completion line: {logs}"));
        assert!(detected < complete, "logs out of order: {logs}");
        assert!(!logs.contains("no changes"), "logs: {logs}");
    }

    #[test]
    fn failed_push_is_logged_as_warning() {
        let git = FakeGit {
            failing: vec!["push"],
            ..FakeGit::with_statuses(vec![Ok(ok("?? new.txt\n"))])
        };
        let lp = fixed_loop(git);
        let (_, logs) = tick_with_logs(&lp);

        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("`git push origin main` exited with code Some(1)"), "logs: {logs}");
        assert!(logs.contains("push complete"), "logs: {logs}");
    }
}
