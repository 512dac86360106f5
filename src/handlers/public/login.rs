// handlers/public/login.rs - GET/POST /login and POST /logout

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::handlers::{redirect_with_message, FlashQuery};
use crate::middleware::cookies::{append_cookies, clearing_cookies, read_cookie, session_cookies};
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(Query(flash): Query<FlashQuery>) -> Html<String> {
    Html(views::login::login_page(flash.message(), ""))
}

/// Exchange email and password for a session and store it in cookies
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return redirect_with_message("/login", "Informe e-mail e senha.").into_response();
    }

    match state.backend.sign_in_with_password(email, &form.password).await {
        Ok(session) => {
            tracing::info!("User {} signed in", session.user.id);
            let mut response = Redirect::to("/dashboard").into_response();
            append_cookies(response.headers_mut(), session_cookies(&state.config.session, &session));
            response
        }
        Err(e) => {
            tracing::warn!("Sign-in failed for {}: {}", email, e);
            redirect_with_message("/login", &e.to_string()).into_response()
        }
    }
}

/// Revoke the session on the platform when possible and drop the cookies
pub async fn logout_post(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = read_cookie(&headers, &state.config.session.access_cookie) {
        if let Err(e) = state.backend.sign_out(&token).await {
            tracing::debug!("Sign-out call failed: {}", e);
        }
    }

    let mut response = redirect_with_message("/login", "Você saiu do painel.").into_response();
    append_cookies(response.headers_mut(), clearing_cookies(&state.config.session));
    response
}
