#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{Account, PasscodeSession, RateLimitScope};
use crate::error::LoginServiceError;

/// Per-client session state, keyed by the session id carried in the client's
/// cookie. The flow treats it as an opaque store and re-reads it at the start
/// of each step; it is the only state shared between requests of one client.
pub trait SessionStore: Send + Sync {
    async fn passcode_session(
        &self,
        sid: &str,
    ) -> Result<Option<PasscodeSession>, LoginServiceError>;

    /// Overwrite the passcode session. Any previous record for this client is
    /// discarded, even one issued for a different email.
    async fn put_passcode_session(
        &self,
        sid: &str,
        session: &PasscodeSession,
    ) -> Result<(), LoginServiceError>;

    async fn clear_passcode_session(&self, sid: &str) -> Result<(), LoginServiceError>;

    /// Authenticated account bound to this client session, if any.
    async fn account_id(&self, sid: &str) -> Result<Option<Uuid>, LoginServiceError>;

    async fn put_account_id(&self, sid: &str, account_id: Uuid) -> Result<(), LoginServiceError>;

    async fn clear_account_id(&self, sid: &str) -> Result<(), LoginServiceError>;

    /// Set a one-time notice for this client (shown on the next page render).
    async fn put_flash(&self, sid: &str, notice: &str) -> Result<(), LoginServiceError>;

    /// Read and consume the pending notice, if any.
    async fn take_flash(&self, sid: &str) -> Result<Option<String>, LoginServiceError>;
}

/// Windowed request counters shared across clients. Implementations must
/// provide atomic increment-and-check so concurrent requests cannot slip past
/// the threshold together.
pub trait RateLimiter: Send + Sync {
    /// Count one hit against `(scope, key)` and report whether the request is
    /// still within the scope's limit.
    async fn hit(&self, scope: RateLimitScope, key: &str) -> Result<bool, LoginServiceError>;
}

/// Passcode delivery. Implementations own transport selection and failover;
/// an `Err` means no transport managed to deliver.
pub trait PasscodeMailer: Send + Sync {
    async fn send_passcode(&self, to: &str, code: &str) -> Result<(), LoginServiceError>;
}

/// Lookup-or-create directory of accounts identified by normalized email.
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, LoginServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, LoginServiceError>;

    /// Find the account for `email`, creating it on first login. Returns the
    /// account and whether it was just created.
    async fn get_or_create(&self, email: &str) -> Result<(Account, bool), LoginServiceError>;
}

/// Monotonic time source for passcode expiry. Seconds since an arbitrary
/// process-local origin; never wall-clock, so it cannot jump backwards.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
