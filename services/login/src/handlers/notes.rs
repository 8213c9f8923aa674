use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::domain::repository::{SessionStore, UserDirectory};
use crate::error::LoginServiceError;
use crate::handlers::login::LITTLENOTE_SID;
use crate::render;
use crate::state::AppState;

// ── GET /notes ────────────────────────────────────────────────────────────────

pub async fn notes_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, LoginServiceError> {
    // Explicit guard: anyone without an authenticated session goes back to
    // the login form.
    let Some(sid) = jar.get(LITTLENOTE_SID).map(|c| c.value().to_owned()) else {
        return Ok(Redirect::to("/").into_response());
    };
    let store = state.session_store();
    let Some(account_id) = store.account_id(&sid).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    let Some(account) = state.user_directory().find_by_id(account_id).await? else {
        // Account deleted since login; drop the stale session.
        store.clear_account_id(&sid).await?;
        return Ok(Redirect::to("/").into_response());
    };

    let notice = store.take_flash(&sid).await?;
    Ok(axum::response::Html(render::notes_page(&account.display_name, notice.as_deref()))
        .into_response())
}

// ── POST /logout ──────────────────────────────────────────────────────────────

pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, LoginServiceError> {
    if let Some(cookie) = jar.get(LITTLENOTE_SID) {
        state.session_store().clear_account_id(cookie.value()).await?;
    }
    Ok(Redirect::to("/").into_response())
}
