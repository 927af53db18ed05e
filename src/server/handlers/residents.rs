use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use serde::Deserialize;

use crate::domain::models::{Page, UserProfile, UserUpdate};
use crate::domain::service::NewResident;
use crate::domain::stats::ResidentStats;
use crate::server::AppState;
use crate::server::errors::ApiError;
use crate::server::extract::{AdminUser, ApiJson, ApiPath, ApiQuery};
use crate::server::responses::ApiResponse;

/// Resident management, restricted to barangay staff.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats/summary", get(summary))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResidentQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ResidentQuery>,
) -> Result<ApiResponse<Vec<UserProfile>>, ApiError> {
    let page = state
        .users
        .list_residents(Page::new(query.page, query.limit), query.search.as_deref())
        .await?;
    Ok(ApiResponse::page(
        format!("Found {} resident accounts", page.items.len()),
        page,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(input): ApiJson<NewResident>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let user = state.users.create_resident(input).await?;
    Ok(ApiResponse::created(
        "Resident account created successfully",
        user.profile(),
    ))
}

pub async fn show(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let user = state.users.get_resident(id).await?;
    Ok(ApiResponse::ok("Resident found", user.profile()))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let user = state.users.update_resident(id, update).await?;
    Ok(ApiResponse::ok("Resident updated successfully", user.profile()))
}

/// Deletes the account together with its document requests.
pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<()>, ApiError> {
    state.users.delete_resident(id).await?;
    let removed = state.documents.delete_for_user(id).await?;
    if removed > 0 {
        tracing::info!(user_id = id, removed, "Removed document requests of deleted resident");
    }
    Ok(ApiResponse::message("Resident account deleted successfully"))
}

pub async fn summary(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<ApiResponse<ResidentStats>, ApiError> {
    let stats = state.users.resident_stats(Utc::now()).await?;
    Ok(ApiResponse::ok(
        "Resident statistics retrieved successfully",
        stats,
    ))
}
