use std::time::Duration;

use anyhow::Context as _;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    transport::smtp::authentication::Credentials,
};
use serde_json::json;

use crate::domain::repository::PasscodeMailer;
use crate::error::LoginServiceError;

/// Both transports give up after this long; the flow must not hang on a slow
/// mail provider.
const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

fn mail_subject(code: &str) -> String {
    format!("Your one-time passcode is {code}.")
}

fn mail_body(code: &str) -> String {
    format!("Here is your one-time passcode for Littlenote: {code}")
}

// ── Primary transport: Resend HTTP API ────────────────────────────────────────

#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(MAIL_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_key,
            from,
        }
    }

    async fn deliver(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": mail_subject(code),
                "text": mail_body(code),
            }))
            .send()
            .await
            .context("resend request")?;
        response.error_for_status().context("resend response")?;
        Ok(())
    }
}

// ── Fallback transport: SMTP ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, user: &str, pass: &str, from: String) -> Self {
        let creds = Credentials::new(user.to_owned(), pass.to_owned());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .expect("invalid SMTP host")
            .credentials(creds)
            .timeout(Some(MAIL_TIMEOUT))
            .build();
        Self { mailer, from }
    }

    async fn deliver(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("from address")?)
            .to(to.parse().context("to address")?)
            .subject(mail_subject(code))
            .body(mail_body(code))
            .context("build message")?;
        self.mailer.send(message).await.context("smtp send")?;
        Ok(())
    }
}

// ── Failover ──────────────────────────────────────────────────────────────────

/// Tries the HTTP API first when configured, then SMTP. A primary failure is
/// logged and absorbed; only every transport failing reaches the caller, as a
/// hard error, because the user cannot continue without their passcode.
#[derive(Clone)]
pub struct FailoverMailer {
    pub primary: Option<ResendMailer>,
    pub fallback: SmtpMailer,
}

impl PasscodeMailer for FailoverMailer {
    async fn send_passcode(&self, to: &str, code: &str) -> Result<(), LoginServiceError> {
        if let Some(primary) = &self.primary {
            match primary.deliver(to, code).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::warn!(error = %error, "primary mail transport failed, trying SMTP");
                }
            }
        }
        self.fallback
            .deliver(to, code)
            .await
            .map_err(LoginServiceError::NotificationDeliveryFailed)
    }
}
