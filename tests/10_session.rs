mod common;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use common::{cookie_header, flash_of, location, set_cookies, TestApp};
use fatoreal_admin::auth::{generate_jwt, AccessClaims};
use fatoreal_admin::backend::SupabaseBackend;
use fatoreal_admin::config::AppConfig;

const EDITOR_ORIGIN: &str = "http://localhost:3000";

/// A well-formed, unexpired token signed with a key the platform does not know
fn forged_token() -> Result<String> {
    let claims = AccessClaims::new("intruso".into(), Some("intruso@exemplo.com".into()), 3600);
    Ok(generate_jwt(&claims, "not-the-platform-secret")?)
}

#[tokio::test]
async fn health_reports_backend_status() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn root_redirects_to_login() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let page = app.client.get(app.url("/login?message=Ol%C3%A1")).send().await?;
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await?;
    assert!(html.contains("Login no Painel Fato Real"));
    assert!(html.contains("Olá"));
    Ok(())
}

#[tokio::test]
async fn pages_without_session_redirect_to_login() -> Result<()> {
    let app = TestApp::spawn().await?;

    for path in ["/dashboard", "/dashboard/cadernos", "/dashboard/noticias/nova"] {
        let res = app.client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", path);
        assert!(location(&res).starts_with("/login?message="), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn api_without_session_is_401_json() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.post(app.url("/api/upload-image")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_password_redirects_with_backend_message() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/login"))
        .form(&[("email", common::EMAIL), ("password", "errada")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(flash_of(&res), "Invalid login credentials");
    assert!(set_cookies(&res).is_empty());
    Ok(())
}

#[tokio::test]
async fn login_sets_cookies_and_opens_dashboard() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.login().await?;
    assert!(cookie.contains("sb-refresh-token="));

    let res = app.get("/dashboard", &cookie).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await?;
    assert!(html.contains("Bem-vindo ao Dashboard!"));
    assert!(html.contains("Acesse www.fatoreal.com.br"));
    assert!(html.contains(common::EMAIL));
    Ok(())
}

#[tokio::test]
async fn expired_access_token_is_refreshed() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.backend.set_token_ttl(-60).await;
    let stale = app.login().await?;
    app.backend.set_token_ttl(3600).await;

    let res = app.get("/dashboard/cadernos", &stale).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let renewed = cookie_header(&res);
    assert!(renewed.contains("sb-access-token="));
    assert!(renewed.contains("sb-refresh-token="));
    assert_ne!(renewed, stale);

    // The rotated pair keeps working without another refresh
    let again = app.get("/dashboard", &renewed).await?;
    assert_eq!(again.status(), StatusCode::OK);
    assert!(set_cookies(&again).is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_cookies_are_cleared() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .get("/dashboard", "sb-access-token=garbage; sb-refresh-token=unknown")
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login?message="));
    let cleared = set_cookies(&res);
    assert_eq!(cleared.len(), 2);
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookies() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.login().await?;

    let res = app.post_form("/logout", &cookie, &[]).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login"));
    assert!(set_cookies(&res).iter().all(|c| c.contains("Max-Age=0")));
    Ok(())
}

#[tokio::test]
async fn without_jwt_secret_the_auth_service_vouches_for_tokens() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.supabase.jwt_secret = None).await?;
    let cookie = app.login().await?;

    let res = app.get("/dashboard", &cookie).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).is_empty());

    let forged = format!("sb-access-token={}", forged_token()?);
    let res = app.get("/dashboard", &forged).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(flash_of(&res), "Sessão expirada. Faça login novamente.");
    Ok(())
}

#[tokio::test]
async fn unreachable_auth_service_is_502_and_keeps_cookies() -> Result<()> {
    // Nothing listens on this port
    let dead_port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let mut config = AppConfig::development();
    config.supabase.url = format!("http://127.0.0.1:{}", dead_port);
    config.supabase.anon_key = "anon".to_string();
    config.supabase.jwt_secret = None;
    config.supabase.request_timeout_secs = 5;
    let backend = SupabaseBackend::new(&config.supabase)?;
    let base_url = common::serve(config, Arc::new(backend)).await?;
    let client = common::client()?;

    let cookie = format!("sb-access-token={}; sb-refresh-token=r1", forged_token()?);
    let res = client
        .get(format!("{}/dashboard", base_url))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&res).is_empty());

    let res = client
        .post(format!("{}/api/upload-image", base_url))
        .header(reqwest::header::COOKIE, "sb-refresh-token=r1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(res.json::<Value>().await?["code"], "BAD_GATEWAY");
    Ok(())
}

#[tokio::test]
async fn upload_preflight_needs_no_session() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .request(Method::OPTIONS, app.url("/api/upload-image"))
        .header(ORIGIN, EDITOR_ORIGIN)
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], EDITOR_ORIGIN);
    Ok(())
}

#[tokio::test]
async fn options_skips_the_session_check_without_cors() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.security.enable_cors = false).await?;

    let res = app
        .client
        .request(Method::OPTIONS, app.url("/api/upload-image"))
        .send()
        .await?;
    // Reaches the route, which only accepts POST
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(set_cookies(&res).is_empty());
    Ok(())
}

#[tokio::test]
async fn api_401_carries_cors_headers() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/api/upload-image"))
        .header(ORIGIN, EDITOR_ORIGIN)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], EDITOR_ORIGIN);
    Ok(())
}
