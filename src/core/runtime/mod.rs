pub mod autopush;
pub mod clock;
pub mod lock;

pub use autopush::{AutoPushLoop, TickOutcome, has_changes};
pub use clock::{Clock, SystemClock, capture_local_offset, commit_message};
