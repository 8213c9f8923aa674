use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::{RedisRateLimiter, RedisSessionStore};
use crate::infra::clock::MonotonicClock;
use crate::infra::db::DbUserDirectory;
use crate::infra::email::FailoverMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub mailer: FailoverMailer,
    pub clock: MonotonicClock,
}

impl AppState {
    pub fn user_directory(&self) -> DbUserDirectory {
        DbUserDirectory {
            db: self.db.clone(),
        }
    }

    pub fn session_store(&self) -> RedisSessionStore {
        RedisSessionStore {
            pool: self.redis.clone(),
        }
    }

    pub fn rate_limiter(&self) -> RedisRateLimiter {
        RedisRateLimiter {
            pool: self.redis.clone(),
        }
    }
}
