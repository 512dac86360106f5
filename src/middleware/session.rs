use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::cookies::{append_cookies, clearing_cookies, read_cookie, session_cookies};
use crate::app::AppState;
use crate::auth::decode_claims;
use crate::backend::{AuthSession, BackendError};
use crate::error::{ApiError, PageError};
use crate::handlers::redirect_with_message;

const LOGIN_REQUIRED: &str = "Faça login para continuar.";
const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";

/// Signed-in user for the current request
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    /// Forwarded to the backend so row policies apply to this user
    pub access_token: String,
}

enum SessionOutcome {
    /// The access cookie is still good
    Valid(SessionUser),
    /// A new token pair was issued and must be written back
    Refreshed(SessionUser, AuthSession),
}

enum SessionFailure {
    /// No usable credentials; the cookies are cleared
    Missing(&'static str),
    /// The auth service could not be asked; the cookies are left alone
    Unavailable,
}

/// Gatekeeper for the dashboard and the upload API.
///
/// Resolves the session cookies into a `SessionUser`, refreshing the token
/// pair when the access token is missing or about to expire. Pages without a
/// session are sent to the login screen; `/api` calls get a 401 JSON body.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    // CORS preflights never carry cookies
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let session_config = &state.config.session;
    let access = read_cookie(request.headers(), &session_config.access_cookie);
    let refresh = read_cookie(request.headers(), &session_config.refresh_cookie);
    let is_api = request.uri().path().starts_with("/api/");

    let outcome = match resolve(&state, access, refresh).await {
        Ok(outcome) => outcome,
        Err(SessionFailure::Missing(message)) => {
            tracing::debug!("No session for {}: {}", request.uri().path(), message);
            let mut response = if is_api {
                ApiError::unauthorized(message).into_response()
            } else {
                redirect_with_message("/login", message).into_response()
            };
            append_cookies(response.headers_mut(), clearing_cookies(session_config));
            return response;
        }
        Err(SessionFailure::Unavailable) => {
            let error = ApiError::bad_gateway("Serviço de autenticação indisponível.");
            return if is_api {
                error.into_response()
            } else {
                PageError(error).into_response()
            };
        }
    };

    match outcome {
        SessionOutcome::Valid(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        SessionOutcome::Refreshed(user, session) => {
            tracing::debug!("Refreshed session for user {}", user.id);
            request.extensions_mut().insert(user);
            let mut response = next.run(request).await;
            append_cookies(response.headers_mut(), session_cookies(session_config, &session));
            response
        }
    }
}

async fn resolve(
    state: &AppState,
    access: Option<String>,
    refresh: Option<String>,
) -> Result<SessionOutcome, SessionFailure> {
    if access.is_none() && refresh.is_none() {
        return Err(SessionFailure::Missing(LOGIN_REQUIRED));
    }

    if let Some(token) = access {
        match check_access_token(state, &token).await {
            Ok(Some(user)) => return Ok(SessionOutcome::Valid(user)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Could not confirm access token: {}", e);
                return Err(SessionFailure::Unavailable);
            }
        }
    }

    let Some(refresh_token) = refresh else {
        return Err(SessionFailure::Missing(SESSION_EXPIRED));
    };

    match state.backend.refresh_session(&refresh_token).await {
        Ok(session) => {
            let user = SessionUser {
                id: session.user.id.clone(),
                email: session.user.email.clone(),
                access_token: session.access_token.clone(),
            };
            Ok(SessionOutcome::Refreshed(user, session))
        }
        Err(BackendError::Transport(e)) => {
            tracing::warn!("Could not refresh session: {}", e);
            Err(SessionFailure::Unavailable)
        }
        Err(e) => {
            tracing::debug!("Refresh rejected: {}", e);
            Err(SessionFailure::Missing(SESSION_EXPIRED))
        }
    }
}

/// `Ok(None)` means the token is unusable and a refresh should be tried
async fn check_access_token(state: &AppState, token: &str) -> Result<Option<SessionUser>, BackendError> {
    let secret = state.config.supabase.jwt_secret.as_deref();
    let claims = match decode_claims(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected access cookie: {}", e);
            return Ok(None);
        }
    };

    let leeway = state.config.session.refresh_leeway_secs;
    if claims.expires_within(Utc::now().timestamp(), leeway) {
        return Ok(None);
    }

    if secret.is_none() {
        // Signature was not checked locally; let the auth service vouch for it
        return match state.backend.get_user(token).await {
            Ok(user) => Ok(Some(SessionUser {
                id: user.id,
                email: user.email,
                access_token: token.to_string(),
            })),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        };
    }

    Ok(Some(SessionUser {
        id: claims.sub,
        email: claims.email,
        access_token: token.to_string(),
    }))
}
