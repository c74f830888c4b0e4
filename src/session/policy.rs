use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

pub const DEFAULT_DURATION_SECONDS: u32 = 90 * 60;
pub const DEFAULT_TAB_SWITCH_LIMIT: u32 = 2;
pub const DEFAULT_FINAL_COUNTDOWN_SECONDS: u32 = 10;

/// Product rules for a single timed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Countdown length when the session starts.
    pub duration_seconds: u32,
    /// The tab switch that reaches this count forces submission. Earlier ones only warn.
    pub tab_switch_limit: u32,
    /// Remaining time at or below which the auto-submit warning is shown.
    pub final_countdown_seconds: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            duration_seconds: DEFAULT_DURATION_SECONDS,
            tab_switch_limit: DEFAULT_TAB_SWITCH_LIMIT,
            final_countdown_seconds: DEFAULT_FINAL_COUNTDOWN_SECONDS,
        }
    }
}

impl SessionPolicy {
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_tab_switch_limit(mut self, limit: u32) -> Self {
        self.tab_switch_limit = limit;
        self
    }

    pub fn with_final_countdown(mut self, seconds: u32) -> Self {
        self.final_countdown_seconds = seconds;
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.tab_switch_limit == 0 {
            return Err(SessionError::InvalidPolicy(
                "tab_switch_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
