//! Liveness route served on PORT in both update modes.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub const HEALTH_MESSAGE: &str = "🦉 Hoooty Bot is alive";

async fn health_check() -> &'static str {
    HEALTH_MESSAGE
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(health_check))
        .layer(TraceLayer::new_for_http())
}
