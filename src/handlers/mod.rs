// handlers/mod.rs - HTTP handlers
//
// public/    login, logout, health and the root redirect
// protected/ dashboard pages and the upload API, behind require_session

use axum::response::Redirect;
use serde::Deserialize;

pub mod protected;
pub mod public;

/// `?message=` carried across redirects and shown once on the next page
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    #[serde(default)]
    pub message: Option<String>,
}

impl FlashQuery {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// 303 to `path` with the message in the query string
pub fn redirect_with_message(path: &str, message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("{}?message={}", path, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    #[test]
    fn test_redirect_with_message_encodes() {
        let response = redirect_with_message("/dashboard/cadernos", "Caderno removido com sucesso!").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/dashboard/cadernos?message=Caderno+removido+com+sucesso%21"
        );
    }

    #[test]
    fn test_blank_flash_is_ignored() {
        let flash = FlashQuery { message: Some("  ".into()) };
        assert_eq!(flash.message(), None);
    }
}
