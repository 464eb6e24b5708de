use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;

use cmdvault_core::{auth, VaultError};

use super::FlashQuery;
use crate::error::AppError;
use crate::flash;
use crate::pages;
use crate::session::{self, CurrentUser, SessionToken};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

/// GET /login
pub async fn login_form(Query(query): Query<FlashQuery>) -> Html<String> {
    pages::login(query.flash.as_deref())
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
pub async fn login(
    State(app): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match auth::authenticate(&app.pool, form.username.trim(), &form.password).await {
        Ok(user) => {
            let cookie = app.sessions.create(user.id).await;
            tracing::info!(username = %user.username, "login");
            Ok((
                AppendHeaders([(SET_COOKIE, session::session_cookie(&cookie))]),
                Redirect::to("/"),
            )
                .into_response())
        }
        // One generic message for unknown user and wrong password alike.
        Err(VaultError::InvalidCredentials) => {
            Ok(flash::redirect_with("/login", "invalid username or password").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(
    State(app): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> impl IntoResponse {
    app.sessions.revoke(&token).await;
    (
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        Redirect::to("/login"),
    )
}

// ---------------------------------------------------------------------------
// Change password
// ---------------------------------------------------------------------------

/// GET /change-password
pub async fn change_password_form(Query(query): Query<FlashQuery>) -> Html<String> {
    pages::change_password(query.flash.as_deref())
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /change-password
///
/// On success every session of the user is revoked — forced re-login is the
/// policy, not an accident.
pub async fn change_password(
    State(app): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, AppError> {
    let result = auth::change_password(
        &app.pool,
        user_id,
        &form.old_password,
        &form.new_password,
        &form.confirm_password,
    )
    .await;

    match result {
        Ok(()) => {
            app.sessions.revoke_user(user_id).await;
            tracing::info!(user_id, "password changed; sessions revoked");
            Ok((
                AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
                flash::redirect_with("/login", "password changed, log in again"),
            )
                .into_response())
        }
        Err(e @ VaultError::Validation(_)) => {
            Ok(flash::redirect_with("/change-password", &e.to_string()).into_response())
        }
        Err(VaultError::InvalidCredentials) => Ok(flash::redirect_with(
            "/change-password",
            "current password is incorrect",
        )
        .into_response()),
        Err(e) => Err(e.into()),
    }
}
