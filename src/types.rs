//! Core value types shared across the redditsaved application.
use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::SavedError;

/// A specialized Result type for redditsaved operations.
pub type Result<T> = std::result::Result<T, SavedError>;

/// Hard cap the listing API places on a single saved-items query.
pub const MAX_FETCH_LIMIT: u32 = 1000;

/// Number of saved items fetched when the user does not ask for a count.
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// A fetch size that is known to respect [`MAX_FETCH_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimit(u32);

impl FetchLimit {
    /// Clamps `requested` into `1..=MAX_FETCH_LIMIT`.
    ///
    /// The flag is `true` when the request was lowered to the cap, so the
    /// caller can tell the user.
    pub fn clamped(requested: u32) -> (Self, bool) {
        if requested > MAX_FETCH_LIMIT {
            (Self(MAX_FETCH_LIMIT), true)
        } else {
            (Self(requested.max(1)), false)
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for FetchLimit {
    fn default() -> Self {
        Self(DEFAULT_FETCH_LIMIT)
    }
}

impl fmt::Display for FetchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounded retry settings for authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubled for every further attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Upper bound for any single delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given (1-based) failed attempt, never more
    /// than `max_backoff_ms`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let delay = self.backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}

/// Everything needed to open a session on the remote account.
#[derive(Clone)]
pub struct Credentials {
    pub user_agent: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_agent", &self.user_agent)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
