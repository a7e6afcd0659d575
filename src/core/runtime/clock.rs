use std::sync::OnceLock;

use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};

// Local offset sampled while the process is still single-threaded.
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

const COMMIT_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Record the local UTC offset for later use by [`SystemClock`].
///
/// `time` refuses to read the local offset once other threads exist (the
/// log writer spawns one), so call this first thing in `main`.
pub fn capture_local_offset() {
    if let Ok(offset) = UtcOffset::current_local_offset() {
        LOCAL_OFFSET.set(offset).ok();
    }
}

/// Source of wall-clock time for commit messages.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Local wall clock. Falls back to the captured offset, then UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| {
            let utc = OffsetDateTime::now_utc();
            LOCAL_OFFSET
                .get()
                .map_or(utc, |offset| utc.to_offset(*offset))
        })
    }
}

/// Render `YYYY-MM-DD HH:MM:SS` in the timestamp's own offset.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(COMMIT_TIMESTAMP)
        .unwrap_or_else(|_| ts.to_string())
}

/// Commit message used for every automatic commit.
#[must_use]
pub fn commit_message(ts: OffsetDateTime) -> String {
    format!("Auto-commit: {}", format_timestamp(ts))
}
