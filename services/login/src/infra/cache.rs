use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;
use uuid::Uuid;

use crate::domain::repository::{RateLimiter, SessionStore};
use crate::domain::types::{
    ACCOUNT_SESSION_TTL_SECS, FLASH_TTL_SECS, PASSCODE_SESSION_TTL_SECS, PasscodeSession,
    RateLimitScope,
};
use crate::error::LoginServiceError;

// ── Session store ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RedisSessionStore {
    pub pool: Pool,
}

fn passcode_key(sid: &str) -> String {
    format!("login:passcode:{sid}")
}

fn account_key(sid: &str) -> String {
    format!("login:account:{sid}")
}

fn flash_key(sid: &str) -> String {
    format!("login:flash:{sid}")
}

impl RedisSessionStore {
    async fn conn(&self) -> Result<deadpool_redis::Connection, LoginServiceError> {
        self.pool
            .get()
            .await
            .map_err(|e| LoginServiceError::Internal(e.into()))
    }
}

impl SessionStore for RedisSessionStore {
    async fn passcode_session(
        &self,
        sid: &str,
    ) -> Result<Option<PasscodeSession>, LoginServiceError> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn
            .get(passcode_key(sid))
            .await
            .map_err(|e| LoginServiceError::Internal(e.into()))?;
        // Corrupt JSON degrades to an all-empty session, which the validator
        // rejects as malformed instead of this layer guessing at intent.
        Ok(raw.map(|bytes| serde_json::from_slice(&bytes).unwrap_or_default()))
    }

    async fn put_passcode_session(
        &self,
        sid: &str,
        session: &PasscodeSession,
    ) -> Result<(), LoginServiceError> {
        let body =
            serde_json::to_vec(session).map_err(|e| LoginServiceError::Internal(e.into()))?;
        let mut conn = self.conn().await?;
        let (): () = conn
            .set_ex(passcode_key(sid), body, PASSCODE_SESSION_TTL_SECS)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn clear_passcode_session(&self, sid: &str) -> Result<(), LoginServiceError> {
        let mut conn = self.conn().await?;
        let (): () = conn
            .del(passcode_key(sid))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn account_id(&self, sid: &str) -> Result<Option<Uuid>, LoginServiceError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get(account_key(sid))
            .await
            .map_err(|e| LoginServiceError::Internal(e.into()))?;
        // An unparseable value is treated as signed-out.
        Ok(value.and_then(|v| v.parse().ok()))
    }

    async fn put_account_id(&self, sid: &str, account_id: Uuid) -> Result<(), LoginServiceError> {
        let mut conn = self.conn().await?;
        let (): () = conn
            .set_ex(
                account_key(sid),
                account_id.to_string(),
                ACCOUNT_SESSION_TTL_SECS,
            )
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn clear_account_id(&self, sid: &str) -> Result<(), LoginServiceError> {
        let mut conn = self.conn().await?;
        let (): () = conn
            .del(account_key(sid))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn put_flash(&self, sid: &str, notice: &str) -> Result<(), LoginServiceError> {
        let mut conn = self.conn().await?;
        let (): () = conn
            .set_ex(flash_key(sid), notice, FLASH_TTL_SECS)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn take_flash(&self, sid: &str) -> Result<Option<String>, LoginServiceError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get_del(flash_key(sid))
            .await
            .map_err(|e| LoginServiceError::Internal(e.into()))?;
        Ok(value)
    }
}

// ── Rate limiter ──────────────────────────────────────────────────────────────

/// Fixed-window counters: `INCR` then `EXPIRE` on the first hit of a window.
/// `INCR` is atomic, so concurrent requests each see a distinct count and at
/// most `max_hits` of them pass.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

fn limit_key(scope: RateLimitScope, key: &str) -> String {
    format!("ratelimit:{}:{}", scope.key_prefix(), key)
}

impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, scope: RateLimitScope, key: &str) -> Result<bool, LoginServiceError> {
        let limit = scope.limit();
        let redis_key = limit_key(scope, key);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| LoginServiceError::Internal(e.into()))?;
        let count: u64 = conn
            .incr(&redis_key, 1)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| LoginServiceError::Internal(e.into()))?;
        if count == 1 {
            let (): () = conn
                .expire(&redis_key, limit.window_secs as i64)
                .await
                .map_err(|e: deadpool_redis::redis::RedisError| {
                    LoginServiceError::Internal(e.into())
                })?;
        }
        Ok(count <= limit.max_hits)
    }
}
