use std::collections::HashSet;

use littlenote_login::domain::types::PasscodeSession;
use littlenote_login::error::FlowError;
use littlenote_login::usecase::passcode::{generate_passcode, validate_passcode};

// ── generate_passcode ────────────────────────────────────────────────────────

#[test]
fn should_generate_six_digit_codes_without_leading_zero() {
    for _ in 0..200 {
        let code = generate_passcode();
        assert_eq!(code.len(), 6, "code {code} should be six digits");
        assert!(
            code.chars().all(|c| c.is_ascii_digit()),
            "code {code} should be all digits"
        );
        assert_ne!(code.as_bytes()[0], b'0', "code {code} has a leading zero");
        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }
}

#[test]
fn should_generate_distinct_codes_across_calls() {
    let codes: HashSet<String> = (0..20).map(|_| generate_passcode()).collect();
    assert!(
        codes.len() > 1,
        "twenty draws should not all be identical"
    );
}

// ── validate_passcode ────────────────────────────────────────────────────────

fn stored(code: &str, email: &str, expires_at: u64) -> PasscodeSession {
    PasscodeSession {
        code: code.to_owned(),
        email: email.to_owned(),
        expires_at,
    }
}

#[test]
fn should_reject_missing_session_as_expired() {
    let result = validate_passcode(None, "alice@example.com", "123456", 0);
    assert_eq!(result, Err(FlowError::SessionExpired));
    assert!(FlowError::SessionExpired.should_reset());
}

#[test]
fn should_reject_malformed_session_fields() {
    let cases = [
        stored("", "alice@example.com", 300),
        stored("123456", "", 300),
        stored("123456", "alice@example.com", 0),
    ];
    for session in &cases {
        let result = validate_passcode(Some(session), "alice@example.com", "123456", 0);
        assert_eq!(
            result,
            Err(FlowError::InvalidSessionData),
            "session {session:?} should be rejected as malformed"
        );
    }
}

#[test]
fn should_report_email_mismatch_before_code_or_expiry() {
    let session = stored("123456", "alice@example.com", 300);

    // Wrong email beats wrong code.
    let result = validate_passcode(Some(&session), "mallory@example.com", "999999", 0);
    assert_eq!(result, Err(FlowError::IncorrectEmail));

    // Wrong email beats even a correct code.
    let result = validate_passcode(Some(&session), "mallory@example.com", "123456", 0);
    assert_eq!(result, Err(FlowError::IncorrectEmail));

    // Wrong email beats expiry.
    let result = validate_passcode(Some(&session), "mallory@example.com", "123456", 1000);
    assert_eq!(result, Err(FlowError::IncorrectEmail));
}

#[test]
fn should_report_wrong_code_without_resetting() {
    let session = stored("123456", "alice@example.com", 300);
    let result = validate_passcode(Some(&session), "alice@example.com", "654321", 0);
    assert_eq!(result, Err(FlowError::IncorrectPasscode));
    assert!(!FlowError::IncorrectPasscode.should_reset());
}

#[test]
fn should_report_wrong_code_before_expiry() {
    let session = stored("123456", "alice@example.com", 300);
    let result = validate_passcode(Some(&session), "alice@example.com", "654321", 1000);
    assert_eq!(result, Err(FlowError::IncorrectPasscode));
}

#[test]
fn should_treat_the_expiry_instant_as_expired() {
    let session = stored("123456", "alice@example.com", 300);

    let result = validate_passcode(Some(&session), "alice@example.com", "123456", 300);
    assert_eq!(result, Err(FlowError::PasscodeExpired));

    let result = validate_passcode(Some(&session), "alice@example.com", "123456", 299);
    assert_eq!(result, Ok(()));
}

#[test]
fn should_accept_a_matching_unexpired_submission() {
    let session = stored("123456", "alice@example.com", 300);
    let result = validate_passcode(Some(&session), "alice@example.com", "123456", 0);
    assert_eq!(result, Ok(()));
}
