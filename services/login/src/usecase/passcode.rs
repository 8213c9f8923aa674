use rand::RngExt;

use crate::domain::types::{PASSCODE_LEN, PasscodeSession};
use crate::error::FlowError;

/// Generate a fresh passcode: exactly `PASSCODE_LEN` decimal digits, uniform
/// over `[10^(N-1), 10^N - 1]` so the first digit is never zero. `rand::rng()`
/// is OS-seeded and suitable for authentication tokens.
pub fn generate_passcode() -> String {
    let lo = 10u32.pow(PASSCODE_LEN - 1);
    let hi = 10u32.pow(PASSCODE_LEN) - 1;
    let mut rng = rand::rng();
    rng.random_range(lo..=hi).to_string()
}

/// Validate a submitted (email, passcode) pair against the stored session.
///
/// Checks run in a fixed order and the first failure wins: presence, shape,
/// email, code, expiry. Email mismatch is reported before code or expiry so a
/// tampered hidden field is caught even alongside a correct or stale code;
/// expiry is reported only once both email and code match, giving an
/// expired-but-correct submission its own message. `FlowError::should_reset`
/// tells the caller whether to destroy the stored session afterwards.
pub fn validate_passcode(
    stored: Option<&PasscodeSession>,
    submitted_email: &str,
    submitted_code: &str,
    now: u64,
) -> Result<(), FlowError> {
    let Some(session) = stored else {
        return Err(FlowError::SessionExpired);
    };
    if !session.is_well_formed() {
        return Err(FlowError::InvalidSessionData);
    }
    if session.email != submitted_email {
        return Err(FlowError::IncorrectEmail);
    }
    if session.code != submitted_code {
        return Err(FlowError::IncorrectPasscode);
    }
    // `>=`: a submission landing exactly on the expiry instant is expired.
    if now >= session.expires_at {
        return Err(FlowError::PasscodeExpired);
    }
    Ok(())
}
