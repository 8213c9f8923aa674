use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::RateLimitScope;

/// Soft flow errors, each mapped to a message on the form the user is
/// currently on. These never cross the handler boundary as HTTP errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    InvalidEmailFormat,
    SessionExpired,
    InvalidSessionData,
    IncorrectEmail,
    IncorrectPasscode,
    PasscodeExpired,
    RateLimited(RateLimitScope),
}

impl FlowError {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidEmailFormat => "Invalid email address. Please try again.",
            Self::SessionExpired => "Session has expired. Please try again.",
            Self::InvalidSessionData => "Invalid session data. Please try again.",
            Self::IncorrectEmail => "Incorrect email address. Please try again.",
            Self::IncorrectPasscode => "Incorrect passcode. Please try again.",
            Self::PasscodeExpired => "Passcode has expired. Please try again.",
            Self::RateLimited(RateLimitScope::General) => {
                "Too many login attempts. Please wait a moment before trying again."
            }
            Self::RateLimited(RateLimitScope::EmailRequest) => {
                "Too many email requests. Please wait a moment before trying again."
            }
            Self::RateLimited(RateLimitScope::PasscodeAttempt) => {
                "Too many passcode attempts. Please wait a moment before trying again."
            }
        }
    }

    /// Whether the stored passcode session must be destroyed after this
    /// failure. Only a wrong passcode keeps the session alive for a retry;
    /// rate limiting and syntax failures never touch session state at all.
    pub fn should_reset(self) -> bool {
        matches!(
            self,
            Self::SessionExpired
                | Self::InvalidSessionData
                | Self::IncorrectEmail
                | Self::PasscodeExpired
        )
    }
}

/// Hard failures that do cross the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum LoginServiceError {
    /// Every configured mail transport failed; the user cannot receive their
    /// passcode, so this surfaces as a hard error instead of a form message.
    #[error("passcode delivery failed")]
    NotificationDeliveryFailed(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl LoginServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotificationDeliveryFailed(_) => "NOTIFICATION_DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for LoginServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotificationDeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Both variants are operational failures worth a log line; tower-http
        // TraceLayer only records method/uri/status.
        match &self {
            Self::NotificationDeliveryFailed(e) => {
                tracing::error!(error = %e, kind = self.kind(), "passcode delivery failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = self.kind(), "internal error");
            }
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
