use std::time::{SystemTime, UNIX_EPOCH};

use crate::foundation::constants::TEST_NOW_MILLIS_ENV_VAR;
use crate::foundation::error::{CivicError, Result};

/// Returns the current unix timestamp in milliseconds, optionally reading
/// an override from the named environment variable first.
pub fn current_timestamp_millis_env(env_var: Option<&str>) -> Result<u64> {
    if let Some(var) = env_var {
        if let Ok(value) = std::env::var(var) {
            return value
                .parse::<u64>()
                .map_err(|err| CivicError::Message(format!("invalid {var}: {err}")));
        }
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| CivicError::Message(err.to_string()))?;
    Ok(now.as_secs().saturating_mul(1_000).saturating_add(u64::from(now.subsec_millis())))
}

/// Current wall-clock timestamp in milliseconds.
///
/// Respects [`TEST_NOW_MILLIS_ENV_VAR`] when set so tests can pin the
/// clock; falls back to the system clock otherwise.
pub fn now_millis() -> u64 {
    current_timestamp_millis_env(Some(TEST_NOW_MILLIS_ENV_VAR))
        .or_else(|_| current_timestamp_millis_env(None))
        .unwrap_or(0)
}
