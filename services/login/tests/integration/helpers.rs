use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use littlenote_login::domain::repository::{
    Clock, PasscodeMailer, RateLimiter, SessionStore, UserDirectory,
};
use littlenote_login::domain::types::{Account, PasscodeSession, RateLimitScope};
use littlenote_login::error::LoginServiceError;
use littlenote_login::usecase::login::{LoginFlowInput, LoginFlowUseCase};

pub const TEST_SID: &str = "session-1";
pub const TEST_IP: &str = "203.0.113.7";

// ── MockSessionStore ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSessionStore {
    passcodes: Arc<Mutex<HashMap<String, PasscodeSession>>>,
    accounts: Arc<Mutex<HashMap<String, Uuid>>>,
    flashes: Arc<Mutex<HashMap<String, String>>>,
}

impl MockSessionStore {
    pub fn stored_passcode(&self, sid: &str) -> Option<PasscodeSession> {
        self.passcodes.lock().unwrap().get(sid).cloned()
    }

    /// Plant a session directly, bypassing the flow (tamper simulation).
    pub fn put_raw_passcode(&self, sid: &str, session: PasscodeSession) {
        self.passcodes
            .lock()
            .unwrap()
            .insert(sid.to_owned(), session);
    }

    pub fn stored_account(&self, sid: &str) -> Option<Uuid> {
        self.accounts.lock().unwrap().get(sid).copied()
    }

    pub fn stored_flash(&self, sid: &str) -> Option<String> {
        self.flashes.lock().unwrap().get(sid).cloned()
    }
}

impl SessionStore for MockSessionStore {
    async fn passcode_session(
        &self,
        sid: &str,
    ) -> Result<Option<PasscodeSession>, LoginServiceError> {
        Ok(self.passcodes.lock().unwrap().get(sid).cloned())
    }

    async fn put_passcode_session(
        &self,
        sid: &str,
        session: &PasscodeSession,
    ) -> Result<(), LoginServiceError> {
        self.passcodes
            .lock()
            .unwrap()
            .insert(sid.to_owned(), session.clone());
        Ok(())
    }

    async fn clear_passcode_session(&self, sid: &str) -> Result<(), LoginServiceError> {
        self.passcodes.lock().unwrap().remove(sid);
        Ok(())
    }

    async fn account_id(&self, sid: &str) -> Result<Option<Uuid>, LoginServiceError> {
        Ok(self.accounts.lock().unwrap().get(sid).copied())
    }

    async fn put_account_id(&self, sid: &str, account_id: Uuid) -> Result<(), LoginServiceError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(sid.to_owned(), account_id);
        Ok(())
    }

    async fn clear_account_id(&self, sid: &str) -> Result<(), LoginServiceError> {
        self.accounts.lock().unwrap().remove(sid);
        Ok(())
    }

    async fn put_flash(&self, sid: &str, notice: &str) -> Result<(), LoginServiceError> {
        self.flashes
            .lock()
            .unwrap()
            .insert(sid.to_owned(), notice.to_owned());
        Ok(())
    }

    async fn take_flash(&self, sid: &str) -> Result<Option<String>, LoginServiceError> {
        Ok(self.flashes.lock().unwrap().remove(sid))
    }
}

// ── MockRateLimiter ──────────────────────────────────────────────────────────

/// Counts hits per (scope, key) against the real scope thresholds; windows
/// never roll over within one test.
#[derive(Clone, Default)]
pub struct MockRateLimiter {
    counts: Arc<Mutex<HashMap<(RateLimitScope, String), u64>>>,
}

impl RateLimiter for MockRateLimiter {
    async fn hit(&self, scope: RateLimitScope, key: &str) -> Result<bool, LoginServiceError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry((scope, key.to_owned())).or_insert(0);
        *count += 1;
        Ok(*count <= scope.limit().max_hits)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockMailer {
    /// A mailer whose every transport is down.
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_code(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .expect("no mail was sent")
            .1
            .clone()
    }
}

impl PasscodeMailer for MockMailer {
    async fn send_passcode(&self, to: &str, code: &str) -> Result<(), LoginServiceError> {
        if self.fail {
            return Err(LoginServiceError::NotificationDeliveryFailed(
                anyhow::anyhow!("all transports failed"),
            ));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), code.to_owned()));
        Ok(())
    }
}

// ── MockUserDirectory ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserDirectory {
    accounts: Arc<Mutex<Vec<Account>>>,
}

impl MockUserDirectory {
    pub fn with_account(email: &str) -> Self {
        let directory = Self::default();
        directory.accounts.lock().unwrap().push(Account {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            display_name: email.to_owned(),
            created_at: Utc::now(),
        });
        directory
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }
}

impl UserDirectory for MockUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, LoginServiceError> {
        Ok(self.account_by_email(email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, LoginServiceError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn get_or_create(&self, email: &str) -> Result<(Account, bool), LoginServiceError> {
        if let Some(existing) = self.account_by_email(email) {
            return Ok((existing, false));
        }
        let account = Account {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            display_name: email.to_owned(),
            created_at: Utc::now(),
        };
        self.accounts.lock().unwrap().push(account.clone());
        Ok((account, true))
    }
}

// ── TestClock ────────────────────────────────────────────────────────────────

/// Settable monotonic clock; starts at zero.
#[derive(Clone, Default)]
pub struct TestClock(Arc<AtomicU64>);

impl TestClock {
    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Flow fixture ─────────────────────────────────────────────────────────────

pub struct TestFlow {
    pub sessions: MockSessionStore,
    pub limiter: MockRateLimiter,
    pub mailer: MockMailer,
    pub users: MockUserDirectory,
    pub clock: TestClock,
}

impl TestFlow {
    pub fn new() -> Self {
        Self {
            sessions: MockSessionStore::default(),
            limiter: MockRateLimiter::default(),
            mailer: MockMailer::default(),
            users: MockUserDirectory::default(),
            clock: TestClock::default(),
        }
    }

    pub fn usecase(
        &self,
    ) -> LoginFlowUseCase<MockSessionStore, MockRateLimiter, MockMailer, MockUserDirectory, TestClock>
    {
        LoginFlowUseCase {
            sessions: self.sessions.clone(),
            limiter: self.limiter.clone(),
            mailer: self.mailer.clone(),
            users: self.users.clone(),
            clock: self.clock.clone(),
        }
    }
}

pub fn email_submission(email: &str) -> LoginFlowInput {
    LoginFlowInput {
        sid: TEST_SID.to_owned(),
        client_ip: TEST_IP.to_owned(),
        email: email.to_owned(),
        passcode: None,
    }
}

pub fn passcode_submission(email: &str, code: &str) -> LoginFlowInput {
    LoginFlowInput {
        sid: TEST_SID.to_owned(),
        client_ip: TEST_IP.to_owned(),
        email: email.to_owned(),
        passcode: Some(code.to_owned()),
    }
}
