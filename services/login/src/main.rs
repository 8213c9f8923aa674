use std::net::SocketAddr;

use sea_orm::Database;
use tracing::info;

use littlenote_core::tracing::init_tracing;
use littlenote_login::config::LoginConfig;
use littlenote_login::infra::clock::MonotonicClock;
use littlenote_login::infra::email::{FailoverMailer, ResendMailer, SmtpMailer};
use littlenote_login::router::build_router;
use littlenote_login::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = LoginConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let fallback = SmtpMailer::new(
        &config.smtp_host,
        &config.smtp_user,
        &config.smtp_pass,
        config.email_from.clone(),
    );
    let primary = config
        .resend_api_key
        .clone()
        .map(|key| ResendMailer::new(key, config.email_from.clone()));
    let mailer = FailoverMailer { primary, fallback };

    let state = AppState {
        db,
        redis,
        mailer,
        clock: MonotonicClock::new(),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.login_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("login service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
