// handlers/public/mod.rs - Routes reachable without a session

use axum::response::Redirect;

pub mod health;
pub mod login;

pub use health::health;
pub use login::{login_page, login_post, logout_post};

/// GET / - the dashboard has no landing page of its own
pub async fn root() -> Redirect {
    Redirect::to("/login")
}
