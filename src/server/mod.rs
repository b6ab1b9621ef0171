//! HTTP surface: shared state and the axum router.

pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::lesson::{LessonGenerator, SessionStore};

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub generator: LessonGenerator,
    pub store: SessionStore,
    /// Directory holding `index.html` and the UI assets.
    pub static_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/suggest", post(handlers::suggest))
        .route("/generate", post(handlers::generate))
        .route(
            "/generate_ept_structure",
            post(handlers::generate_ept_structure),
        )
        .route("/download", get(handlers::download))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Purge expired sessions every `period` until the task is dropped.
pub async fn purge_sessions(store: SessionStore, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let removed = store.purge_expired();
        if removed > 0 {
            debug!(removed, remaining = store.len(), "Purged expired sessions");
        }
    }
}
