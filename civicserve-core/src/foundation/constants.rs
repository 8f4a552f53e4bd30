//! System-wide constants.

/// Default maximum length of a request title, in characters.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 200;

/// Default maximum length of a request description, in characters.
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 1_200;

/// Default maximum number of whitespace-separated words in a description.
pub const DEFAULT_MAX_DESCRIPTION_WORDS: usize = 150;

/// Default maximum length of free-text messages attached to lifecycle
/// operations (status messages, reopen reasons, alarm text).
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;

/// Default bound of a per-connection live notification queue.
pub const DEFAULT_CONNECTION_QUEUE_CAPACITY: usize = 64;

/// Default SSE keepalive interval, in seconds.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 20;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8490";

/// Default HTTP request body limit, in bytes.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 256 * 1024;

/// Default per-client request rate for the HTTP rate limiter.
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 30;

/// Default per-client burst allowance on top of the base rate.
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 60;

/// Rate limiter window length, in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 1;

/// How often the rate limiter sweeps idle client entries, in seconds.
pub const RATE_LIMIT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Idle TTL after which a client entry is dropped from the rate limiter,
/// in seconds.
pub const RATE_LIMIT_ENTRY_TTL_SECS: u64 = 300;

/// Environment variable honored by [`crate::foundation::time::now_millis`]
/// so tests can pin the clock.
pub const TEST_NOW_MILLIS_ENV_VAR: &str = "CIVICSERVE_TEST_NOW_MILLIS";
