use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use url::Url;

use super::{
    ensure_conditions, AuthBackend, AuthSession, AuthUser, BackendError, StorageBackend, TableBackend,
    UploadOptions,
};
use crate::config::SupabaseConfig;
use crate::filter::Filter;

/// HTTP client for a hosted Supabase project (auth, REST and storage APIs)
#[derive(Clone)]
pub struct SupabaseBackend {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        if config.anon_key.is_empty() {
            return Err(BackendError::Config("SUPABASE_ANON_KEY is not set".to_string()));
        }

        let base = Url::parse(&config.url)
            .map_err(|e| BackendError::Config(format!("invalid SUPABASE_URL '{}': {}", config.url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Config(format!("cannot build URL for '{}': {}", path, e)))
    }

    /// Every call carries the project key; the bearer is the user's token
    /// when there is one, otherwise the anon key itself.
    fn request(&self, method: Method, url: Url, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    fn rest_url(&self, table: &str) -> Result<Url, BackendError> {
        self.endpoint(&format!("/rest/v1/{}", table))
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<AuthSession, BackendError> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self.request(Method::POST, url, None).json(&body).send().await?;
        let response = check(response).await?;
        response
            .json::<AuthSession>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("token response: {}", e)))
    }

    async fn rows(response: Response) -> Result<Vec<Value>, BackendError> {
        let response = check(response).await?;
        match response.json::<Value>().await {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(BackendError::InvalidResponse(format!("rows: {}", e))),
        }
    }
}

/// Turn a non-2xx response into a `BackendError` carrying the platform's message
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    tracing::debug!("Backend responded {}: {}", status, message);
    Err(BackendError::from_status(status.as_u16(), message))
}

/// The auth, REST and storage services each shape their error bodies
/// differently; take the first human-readable field present.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(s)) = map.get(key) {
                if !s.is_empty() {
                    return s.clone();
                }
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl AuthBackend for SupabaseBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("/auth/v1/user")?;
        let response = self.request(Method::GET, url, Some(access_token)).send().await?;
        let response = check(response).await?;
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("user response: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("/auth/v1/logout")?;
        let response = self.request(Method::POST, url, Some(access_token)).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        let url = self.endpoint("/auth/v1/health")?;
        let response = self.request(Method::GET, url, None).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TableBackend for SupabaseBackend {
    async fn select(&self, access_token: &str, filter: &Filter) -> Result<Vec<Value>, BackendError> {
        filter.validate()?;
        let url = self.rest_url(filter.table_name())?;
        let response = self
            .request(Method::GET, url, Some(access_token))
            .query(&filter.to_query_pairs())
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, access_token: &str, table: &str, row: Value) -> Result<Vec<Value>, BackendError> {
        Filter::table(table).validate()?;
        let url = self.rest_url(table)?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(&self, access_token: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, BackendError> {
        filter.validate()?;
        ensure_conditions(filter)?;
        let url = self.rest_url(filter.table_name())?;
        let response = self
            .request(Method::PATCH, url, Some(access_token))
            .header("Prefer", "return=representation")
            .query(&filter.where_pairs())
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, access_token: &str, filter: &Filter) -> Result<usize, BackendError> {
        filter.validate()?;
        ensure_conditions(filter)?;
        let url = self.rest_url(filter.table_name())?;
        let response = self
            .request(Method::DELETE, url, Some(access_token))
            .header("Prefer", "return=representation")
            .query(&filter.where_pairs())
            .send()
            .await?;
        Ok(Self::rows(response).await?.len())
    }
}

#[async_trait]
impl StorageBackend for SupabaseBackend {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("/storage/v1/object/{}/{}", bucket, path))?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .header(header::CONTENT_TYPE, options.content_type)
            .header(header::CACHE_CONTROL, format!("max-age={}", options.cache_control_secs))
            .header("x-upsert", options.upsert.to_string())
            .body(bytes)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base.as_str().trim_end_matches('/'),
            bucket,
            path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new(&SupabaseConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            jwt_secret: None,
            request_timeout_secs: 5,
        })
        .expect("valid config")
    }

    #[test]
    fn test_new_requires_anon_key() {
        let result = SupabaseBackend::new(&SupabaseConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: String::new(),
            jwt_secret: None,
            request_timeout_secs: 5,
        });
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn test_public_url_layout() {
        assert_eq!(
            backend().public_url("capanoticia", "capanoticia/1700000000000-foto.png"),
            "https://example.supabase.co/storage/v1/object/public/capanoticia/capanoticia/1700000000000-foto.png"
        );
    }

    #[test]
    fn test_error_message_picks_known_fields() {
        assert_eq!(
            error_message(400, r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(400, r#"{"error":"invalid_grant","error_description":"Refresh Token Not Found"}"#),
            "Refresh Token Not Found"
        );
        assert_eq!(
            error_message(409, r#"{"code":"23505","details":null,"message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(error_message(502, ""), "HTTP 502");
        assert_eq!(error_message(500, "upstream timeout"), "upstream timeout");
    }
}
