use std::net::SocketAddr;

use axum::{
    Form,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::repository::SessionStore;
use crate::domain::types::{ACCOUNT_SESSION_TTL_SECS, FlowOutcome};
use crate::error::{FlowError, LoginServiceError};
use crate::render;
use crate::state::AppState;
use crate::usecase::login::{LoginFlowInput, LoginFlowUseCase};

/// Cookie carrying the client session id.
pub const LITTLENOTE_SID: &str = "littlenote_sid";

const HX_REDIRECT: &str = "hx-redirect";

fn is_hx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Read the session id, minting one (and the cookie) for first-time clients.
fn ensure_sid(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(LITTLENOTE_SID) {
        let sid = cookie.value().to_owned();
        return (jar, sid);
    }
    let sid = Uuid::new_v4().to_string();
    let cookie = Cookie::build((LITTLENOTE_SID, sid.clone()))
        .path("/")
        .max_age(time::Duration::seconds(ACCOUNT_SESSION_TTL_SECS as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), sid)
}

/// Client IP for rate limiting: first `x-forwarded-for` hop when behind a
/// proxy, else the peer address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    // axum-core declares this as `fn -> impl Future + Send`; writing it as
    // `async fn` trips E0195 under precise capturing. Read the parts
    // synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        async move {
            let ip = forwarded
                .or(peer)
                .unwrap_or_else(|| "unknown".to_owned());
            Ok(Self(ip))
        }
    }
}

// ── GET / ─────────────────────────────────────────────────────────────────────

pub async fn front_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, LoginServiceError> {
    // Signed-in clients skip the login form entirely.
    if let Some(cookie) = jar.get(LITTLENOTE_SID) {
        if state
            .session_store()
            .account_id(cookie.value())
            .await?
            .is_some()
        {
            return Ok(Redirect::to("/notes").into_response());
        }
    }
    Ok(render::form_response(false, render::email_form(None)).into_response())
}

// ── POST / ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub passcode: Option<String>,
}

pub async fn submit_login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    client_ip: ClientIp,
    Form(form): Form<LoginForm>,
) -> Result<Response, LoginServiceError> {
    let (jar, sid) = ensure_sid(jar);
    let partial = is_hx_request(&headers);

    let usecase = LoginFlowUseCase {
        sessions: state.session_store(),
        limiter: state.rate_limiter(),
        mailer: state.mailer.clone(),
        users: state.user_directory(),
        clock: state.clock,
    };

    let outcome = usecase
        .execute(LoginFlowInput {
            sid,
            client_ip: client_ip.0,
            email: form.email,
            passcode: form.passcode,
        })
        .await?;

    let response = match outcome {
        FlowOutcome::Authenticated { .. } => {
            if partial {
                (jar, [(HX_REDIRECT, "/notes")], StatusCode::OK).into_response()
            } else {
                (jar, Redirect::to("/notes")).into_response()
            }
        }
        FlowOutcome::EmailEntry { error } => {
            let fragment = render::email_form(error.map(FlowError::message));
            (jar, render::form_response(partial, fragment)).into_response()
        }
        FlowOutcome::PasscodeEntry {
            email,
            user_has_account,
            passcode_sent,
            error,
        } => {
            let fragment = render::passcode_form(
                &email,
                user_has_account,
                passcode_sent,
                error.map(FlowError::message),
            );
            (jar, render::form_response(partial, fragment)).into_response()
        }
    };
    Ok(response)
}
