/// Login service configuration loaded from environment variables.
///
/// Flow constants (passcode length, lifetime, rate-limit thresholds) are code
/// constants in `domain::types`, not env vars.
#[derive(Debug)]
pub struct LoginConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// Sender address for passcode mail.
    pub email_from: String,
    /// Resend API key; when set, the HTTP API becomes the primary mail
    /// transport with SMTP as fallback. Env var: `RESEND_API_KEY`.
    pub resend_api_key: Option<String>,
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP username.
    pub smtp_user: String,
    /// SMTP password.
    pub smtp_pass: String,
    /// TCP port to listen on (default 3100). Env var: `LOGIN_PORT`.
    pub login_port: u16,
}

impl LoginConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            email_from: std::env::var("EMAIL_FROM").expect("EMAIL_FROM"),
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            smtp_host: std::env::var("SMTP_HOST").expect("SMTP_HOST"),
            smtp_user: std::env::var("SMTP_USER").expect("SMTP_USER"),
            smtp_pass: std::env::var("SMTP_PASS").expect("SMTP_PASS"),
            login_port: std::env::var("LOGIN_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
        }
    }
}
