pub mod auth;
pub mod error;
pub mod images;
pub mod middleware;
pub mod storage;
pub mod stories;
pub mod token;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tracing::error;

use travelog_db::Database;

use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::storage::ImageStore;
use crate::token::TokenService;

/// 10 MB upload limit for images
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    pub images: ImageStore,
    /// Base URL that uploaded images are served under, e.g. `http://localhost:8000`.
    pub public_url: String,
}

/// All JSON routes. Static mounts and host-level layers are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/create-account", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/image-upload",
            post(images::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE)),
        )
        .route("/delete-image", delete(images::delete_image));

    let protected_routes = Router::new()
        .route("/get-user", get(auth::get_user))
        .route("/add-travel-story", post(stories::add_travel_story))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run blocking work (SQLite, password hashing) off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Internal server error".into())
    })?
}
