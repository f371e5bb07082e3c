//! Session configuration

use std::time::Duration;

/// Timing knobs for the session manager's background refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the scheduler checks the token's remaining lifetime
    pub check_interval: Duration,

    /// Remaining lifetime at or below which a refresh is issued
    pub refresh_threshold: Duration,
}

impl SessionConfig {
    /// Check every 4 minutes, refresh once less than 5 minutes remain.
    ///
    /// The check interval must stay below the threshold, otherwise a
    /// token could expire between two checks.
    pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(240);
    pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(300);
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval: Self::DEFAULT_CHECK_INTERVAL,
            refresh_threshold: Self::DEFAULT_REFRESH_THRESHOLD,
        }
    }
}
