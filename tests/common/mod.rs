#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use fatoreal_admin::backend::{Backend, MemoryBackend};
use fatoreal_admin::config::AppConfig;
use fatoreal_admin::{router, AppState};

pub const EMAIL: &str = "redacao@fatoreal.com.br";
pub const PASSWORD: &str = "senha-forte";
pub const JWT_SECRET: &str = "integration-test-secret";

/// A dashboard served on a free port, backed by an in-memory platform
pub struct TestApp {
    pub base_url: String,
    pub backend: Arc<MemoryBackend>,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let backend = Arc::new(MemoryBackend::new(JWT_SECRET));
        backend.add_user(EMAIL, PASSWORD).await;

        let mut config = AppConfig::development();
        config.supabase.jwt_secret = Some(JWT_SECRET.to_string());
        configure(&mut config);

        let base_url = serve(config, backend.clone()).await?;

        Ok(Self {
            base_url,
            backend,
            client: client()?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign in through the login form and return a `Cookie` header value
    pub async fn login(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/login"))
            .form(&[("email", EMAIL), ("password", PASSWORD)])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::SEE_OTHER, "login answered {}", res.status());
        anyhow::ensure!(location(&res) == "/dashboard", "login redirected to {}", location(&res));

        let cookie = cookie_header(&res);
        anyhow::ensure!(cookie.contains("sb-access-token="), "no session cookie in {:?}", cookie);
        Ok(cookie)
    }

    pub async fn get(&self, path: &str, cookie: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).header(COOKIE, cookie).send().await?)
    }

    pub async fn post_form(&self, path: &str, cookie: &str, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header(COOKIE, cookie)
            .form(form)
            .send()
            .await?)
    }

    pub async fn post_multipart(&self, path: &str, cookie: &str, form: reqwest::multipart::Form) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header(COOKIE, cookie)
            .multipart(form)
            .send()
            .await?)
    }

    pub async fn seed_caderno(&self, nome: &str, ativo: bool) -> i64 {
        let row = self
            .backend
            .seed("cadernos", json!({ "nomecaderno": nome, "ativo": ativo }))
            .await;
        row["id"].as_i64().unwrap_or_default()
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.backend.rows(table).await
    }
}

/// Serve the dashboard over any backend on a free port and return its base URL
pub async fn serve(config: AppConfig, backend: Arc<dyn Backend>) -> Result<String> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let app = router(AppState::new(config, backend));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Redirects are asserted on, never followed
pub fn client() -> Result<Client> {
    Ok(Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

pub fn location(res: &Response) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `name=value` pairs from every non-empty `Set-Cookie`, joined for a `Cookie` header
pub fn cookie_header(res: &Response) -> String {
    set_cookies(res)
        .into_iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .filter(|pair| !pair.ends_with('='))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn set_cookies(res: &Response) -> Vec<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Flash message carried in a redirect, decoded
pub fn flash_of(res: &Response) -> String {
    let location = location(res);
    let query = location.split_once('?').map(|(_, q)| q).unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "message")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

pub fn png_part(name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
        .file_name(name.to_string())
        .mime_str("image/png")
        .expect("valid mime")
}
