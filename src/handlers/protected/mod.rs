// handlers/protected/mod.rs - Routes behind require_session
//
// Every handler receives the SessionUser inserted by the middleware and
// forwards its access token to the services.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::ApiError;
use crate::handlers::redirect_with_message;
use crate::services::ServiceError;
use crate::storage::UploadError;

pub mod cadernos;
pub mod dashboard;
pub mod noticias;
pub mod upload;

fn lost_session(err: &ServiceError) -> bool {
    match err {
        ServiceError::Backend(e) | ServiceError::Upload(UploadError::Storage(e)) => e.is_unauthorized(),
        _ => false,
    }
}

/// A rejected token mid-request sends the editor back to the login screen
fn login_again() -> Response {
    redirect_with_message("/login", "Sessão expirada. Faça login novamente.").into_response()
}

/// Re-render a form with the failure message and the matching status
pub(crate) fn form_failure(err: ServiceError, action: &str, render: impl FnOnce(&str) -> String) -> Response {
    if lost_session(&err) {
        return login_again();
    }
    let message = err.failure_message(action);
    let status = ApiError::from(err).status();
    (status, Html(render(&message))).into_response()
}

/// Redirect back to a list page with the failure message
pub(crate) fn action_failure(err: ServiceError, action: &str, back: &str) -> Response {
    if lost_session(&err) {
        return login_again();
    }
    tracing::warn!("Failed to {}: {}", action, err);
    redirect_with_message(back, &err.failure_message(action)).into_response()
}

pub(crate) fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("O arquivo enviado excede o tamanho máximo permitido.")
    } else {
        ApiError::bad_request(format!("Formulário inválido: {}", err.body_text()))
    }
}
