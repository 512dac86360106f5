use std::sync::Arc;

use anyhow::Context;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::Backend;
use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::require_session;
use crate::services::{CadernoService, NoticiaService};

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn Backend>,
    pub cadernos: CadernoService,
    pub noticias: NoticiaService,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            cadernos: CadernoService::new(backend.clone()),
            noticias: NoticiaService::new(backend.clone(), config.storage.clone()),
            config: Arc::new(config),
            backend,
        }
    }
}

/// Multipart bodies carry one image plus the text fields
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let pages = Router::new()
        .merge(dashboard_routes())
        .merge(caderno_routes())
        .merge(noticia_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes())
        .merge(pages)
        .merge(api_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/login", get(public::login_page).post(public::login_post))
        .route("/logout", post(public::logout_post))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(protected::dashboard::home))
}

fn caderno_routes() -> Router<AppState> {
    use protected::cadernos;

    Router::new()
        .route("/dashboard/cadernos", get(cadernos::list).post(cadernos::create))
        .route("/dashboard/cadernos/novo", get(cadernos::new_form))
        .route("/dashboard/cadernos/:id", post(cadernos::update))
        .route("/dashboard/cadernos/:id/edit", get(cadernos::edit_form))
        .route("/dashboard/cadernos/:id/toggle", post(cadernos::toggle))
        .route("/dashboard/cadernos/:id/delete", post(cadernos::delete))
}

fn noticia_routes() -> Router<AppState> {
    use protected::noticias;

    Router::new()
        .route("/dashboard/noticias", get(noticias::list).post(noticias::create))
        .route("/dashboard/noticias/nova", get(noticias::new_form))
        .route("/dashboard/noticias/:id", post(noticias::update))
        .route("/dashboard/noticias/:id/edit", get(noticias::edit_form))
        .route("/dashboard/noticias/:id/toggle", post(noticias::toggle))
        .route("/dashboard/noticias/:id/delete", post(noticias::delete))
}

/// CORS wraps the session check so that 401 answers carry the CORS headers too
fn api_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/api/upload-image", post(protected::upload::upload_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));
    match cors_layer(&state.config.security) {
        Some(cors) => routes.layer(cors),
        None => routes,
    }
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_credentials(true),
    )
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Fato Real admin listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
