use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FlowError;

/// Account in the user directory. Created lazily on first successful
/// passcode login; the display name defaults to the email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Ephemeral passcode state bound to one client session.
///
/// Stored as JSON in the per-client session; deserialization is permissive
/// (`serde(default)`) so a tampered or truncated record surfaces as empty
/// fields for the validator to reject rather than as a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasscodeSession {
    pub code: String,
    pub email: String,
    /// Monotonic seconds (from the injected clock), not wall-clock.
    pub expires_at: u64,
}

impl PasscodeSession {
    /// Structurally complete: every field present and non-empty.
    pub fn is_well_formed(&self) -> bool {
        !self.code.is_empty() && !self.email.is_empty() && self.expires_at != 0
    }
}

/// Tagged result of one flow submission: which form is active, with its
/// context, or a completed authentication handing off to the rest of the app.
/// Soft failures travel inside the active step, never as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    EmailEntry {
        error: Option<FlowError>,
    },
    PasscodeEntry {
        email: String,
        user_has_account: bool,
        /// A code was issued by this very submission (as opposed to returning
        /// to the form after a failed attempt).
        passcode_sent: bool,
        error: Option<FlowError>,
    },
    Authenticated {
        account_id: Uuid,
        new_account: bool,
    },
}

/// One independent rate-limit counter family. Each scope has its own Redis
/// key prefix, threshold and window; hitting one never consumes another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// Whole-endpoint flood guard, keyed by client IP.
    General,
    /// Passcode issuance guard, keyed by submitted email.
    EmailRequest,
    /// Passcode verification guard, keyed by submitted email.
    PasscodeAttempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_hits: u64,
    pub window_secs: u64,
}

impl RateLimitScope {
    pub fn limit(self) -> RateLimit {
        match self {
            Self::General => RateLimit {
                max_hits: 15,
                window_secs: 60,
            },
            Self::EmailRequest => RateLimit {
                max_hits: 3,
                window_secs: 3600,
            },
            Self::PasscodeAttempt => RateLimit {
                max_hits: 5,
                window_secs: 60,
            },
        }
    }

    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::EmailRequest => "code",
            Self::PasscodeAttempt => "verify",
        }
    }
}

/// Passcode length in decimal digits.
pub const PASSCODE_LEN: u32 = 6;

/// Passcode time-to-live in monotonic seconds.
pub const PASSCODE_LIFETIME_SECS: u64 = 300;

/// Redis TTL for the stored passcode session. Slightly above the passcode
/// lifetime so expiry is always decided by the validator, not by Redis.
pub const PASSCODE_SESSION_TTL_SECS: u64 = 360;

/// Authenticated session lifetime in seconds (7 days).
pub const ACCOUNT_SESSION_TTL_SECS: u64 = 604_800;

/// One-time flash notice TTL in seconds.
pub const FLASH_TTL_SECS: u64 = 300;

/// Flash notice shown once to newly created accounts.
pub const WELCOME_NEW_ACCOUNT: &str = "Welcome to Littlenote!";
