//! Built-in fallback values for configuration.

/// Sequence-list refresh period.
pub const SEQUENCE_LIST_INTERVAL_SECS: u64 = 30;

/// Unfinished-sequence trace refresh period.
///
/// Ten seconds, matching the selected-sequence poll.
pub const UNFINISHED_TRACES_INTERVAL_SECS: u64 = 10;

pub const SELECTED_TRACES_INTERVAL_SECS: u64 = 10;

/// Sequences older than this get a manual reload instead of a poll.
pub const LIVE_WINDOW_HOURS: u64 = 24;

/// Upper bound keeping the window representable as a chrono duration.
pub const MAX_LIVE_WINDOW_HOURS: i64 = 24 * 365 * 100;

pub const DATA_DIR: &str = "./data";

pub const PAGE_SIZE: usize = 25;
