use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Utc;

use crate::backend::AuthSession;
use crate::config::SessionConfig;

/// Value of the named cookie from every `Cookie` header on the request
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A `Set-Cookie` value for one of the session cookies
pub fn build_cookie(name: &str, value: &str, max_age_secs: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", max_age.max(0)));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Access and refresh cookies for a freshly issued session
pub fn session_cookies(config: &SessionConfig, session: &AuthSession) -> Vec<String> {
    let access_max_age = session
        .expires_in
        .or_else(|| session.expires_at.map(|at| at - Utc::now().timestamp()));
    let refresh_max_age = config.refresh_cookie_max_age_days * 24 * 60 * 60;

    vec![
        build_cookie(&config.access_cookie, &session.access_token, access_max_age, config.cookie_secure),
        build_cookie(
            &config.refresh_cookie,
            &session.refresh_token,
            Some(refresh_max_age),
            config.cookie_secure,
        ),
    ]
}

pub fn clearing_cookies(config: &SessionConfig) -> Vec<String> {
    vec![
        build_cookie(&config.access_cookie, "", Some(0), config.cookie_secure),
        build_cookie(&config.refresh_cookie, "", Some(0), config.cookie_secure),
    ]
}

/// Append `Set-Cookie` headers, skipping any value that is not a valid header
pub fn append_cookies(headers: &mut HeaderMap, cookies: Vec<String>) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping malformed Set-Cookie value: {}", e),
        }
    }
}
