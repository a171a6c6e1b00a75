pub mod auth;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod render;
pub mod updates;
pub mod views;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use bulletin_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;

/// All routes, without transport layers (CORS, tracing) so tests can drive
/// the router directly.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route(
            "/api/companies/{company_id}/updates",
            get(updates::list_updates).post(updates::create_update),
        )
        .route(
            "/api/companies/{company_id}/updates/{id}",
            get(updates::get_update).delete(updates::delete_update),
        )
        .route(views::LIST_PATH, get(pages::list_page))
        .route("/updates/company/{id}", get(pages::detail_page))
        .route("/updates/company/{id}/delete", post(pages::delete_action))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run a database call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
        .map_err(ApiError::from)
}
