use std::sync::LazyLock;

use regex::Regex;

use crate::domain::repository::{Clock, PasscodeMailer, RateLimiter, SessionStore, UserDirectory};
use crate::domain::types::{
    FlowOutcome, PASSCODE_LIFETIME_SECS, PasscodeSession, RateLimitScope, WELCOME_NEW_ACCOUNT,
};
use crate::error::{FlowError, LoginServiceError};
use crate::usecase::passcode::{generate_passcode, validate_passcode};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Lowercase and trim an email address before any comparison or storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub struct LoginFlowInput {
    /// Client session id from the `littlenote_sid` cookie.
    pub sid: String,
    /// Client IP for the whole-endpoint flood guard.
    pub client_ip: String,
    pub email: String,
    /// Present (and non-blank) means this is a verification attempt;
    /// absent means the client is requesting a passcode.
    pub passcode: Option<String>,
}

/// The passcode login state machine. One submission comes in, one tagged step
/// goes out; everything the flow touches arrives through ports so the whole
/// machine runs against in-memory fakes in tests.
pub struct LoginFlowUseCase<S, L, M, U, C>
where
    S: SessionStore,
    L: RateLimiter,
    M: PasscodeMailer,
    U: UserDirectory,
    C: Clock,
{
    pub sessions: S,
    pub limiter: L,
    pub mailer: M,
    pub users: U,
    pub clock: C,
}

impl<S, L, M, U, C> LoginFlowUseCase<S, L, M, U, C>
where
    S: SessionStore,
    L: RateLimiter,
    M: PasscodeMailer,
    U: UserDirectory,
    C: Clock,
{
    pub async fn execute(&self, input: LoginFlowInput) -> Result<FlowOutcome, LoginServiceError> {
        if !self
            .limiter
            .hit(RateLimitScope::General, &input.client_ip)
            .await?
        {
            return Ok(FlowOutcome::EmailEntry {
                error: Some(FlowError::RateLimited(RateLimitScope::General)),
            });
        }

        let email = normalize_email(&input.email);
        // Re-checked on both steps: the passcode form carries the email in a
        // hidden field, which the client can tamper with on resubmission.
        if !is_valid_email(&email) {
            return Ok(FlowOutcome::EmailEntry {
                error: Some(FlowError::InvalidEmailFormat),
            });
        }

        let passcode = input
            .passcode
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());

        match passcode {
            None => self.submit_email(&input.sid, &email).await,
            Some(code) => self.submit_passcode(&input.sid, &email, code).await,
        }
    }

    /// Step one: issue a passcode for the submitted address and mail it out.
    async fn submit_email(
        &self,
        sid: &str,
        email: &str,
    ) -> Result<FlowOutcome, LoginServiceError> {
        if !self.limiter.hit(RateLimitScope::EmailRequest, email).await? {
            return Ok(FlowOutcome::EmailEntry {
                error: Some(FlowError::RateLimited(RateLimitScope::EmailRequest)),
            });
        }

        // Existence is only a presentation hint ("welcome back" framing);
        // the passcode is issued either way so addresses are not enumerable.
        let user_has_account = self.users.find_by_email(email).await?.is_some();

        let code = generate_passcode();
        let session = PasscodeSession {
            code: code.clone(),
            email: email.to_owned(),
            expires_at: self.clock.now() + PASSCODE_LIFETIME_SECS,
        };
        self.sessions.put_passcode_session(sid, &session).await?;
        self.mailer.send_passcode(email, &code).await?;

        Ok(FlowOutcome::PasscodeEntry {
            email: email.to_owned(),
            user_has_account,
            passcode_sent: true,
            error: None,
        })
    }

    /// Step two: verify a submitted passcode against the stored session.
    async fn submit_passcode(
        &self,
        sid: &str,
        email: &str,
        code: &str,
    ) -> Result<FlowOutcome, LoginServiceError> {
        if !self
            .limiter
            .hit(RateLimitScope::PasscodeAttempt, email)
            .await?
        {
            // Stay on the passcode form with the email preserved; the stored
            // session is untouched so the user can retry after the window.
            return Ok(FlowOutcome::PasscodeEntry {
                email: email.to_owned(),
                user_has_account: false,
                passcode_sent: false,
                error: Some(FlowError::RateLimited(RateLimitScope::PasscodeAttempt)),
            });
        }

        let stored = self.sessions.passcode_session(sid).await?;
        match validate_passcode(stored.as_ref(), email, code, self.clock.now()) {
            Err(error) if error.should_reset() => {
                self.sessions.clear_passcode_session(sid).await?;
                Ok(FlowOutcome::EmailEntry { error: Some(error) })
            }
            Err(error) => {
                let user_has_account = self.users.find_by_email(email).await?.is_some();
                Ok(FlowOutcome::PasscodeEntry {
                    email: email.to_owned(),
                    user_has_account,
                    passcode_sent: false,
                    error: Some(error),
                })
            }
            Ok(()) => {
                let (account, created) = self.users.get_or_create(email).await?;
                self.sessions.put_account_id(sid, account.id).await?;
                self.sessions.clear_passcode_session(sid).await?;
                if created {
                    self.sessions.put_flash(sid, WELCOME_NEW_ACCOUNT).await?;
                }
                Ok(FlowOutcome::Authenticated {
                    account_id: account.id,
                    new_account: created,
                })
            }
        }
    }
}
