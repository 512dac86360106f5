// handlers/protected/dashboard.rs - GET /dashboard

use axum::{extract::State, response::Html, Extension};

use crate::app::AppState;
use crate::middleware::SessionUser;
use crate::views;

pub async fn home(State(state): State<AppState>, Extension(user): Extension<SessionUser>) -> Html<String> {
    Html(views::dashboard::home_page(&state.config.branding, user.email.as_deref()))
}
