pub mod announcements;
pub mod auth;
pub mod documents;
pub mod health;
pub mod residents;

use axum::{Router, routing::get};

use crate::server::AppState;
use crate::server::errors::ApiError;

/// Every route under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(health::api_test))
        .nest("/auth", auth::routes())
        .nest("/residents", residents::routes())
        .nest("/documents", documents::routes())
        .nest("/announcements", announcements::routes())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
