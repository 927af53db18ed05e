use axum::{Router, extract::State, routing::get};
use serde::Deserialize;

use crate::domain::models::{
    AnnouncementFilter, AnnouncementType, AnnouncementUpdate, AnnouncementView, MAX_LIMIT,
    NewAnnouncement, Page, Priority,
};
use crate::domain::service::DEFAULT_RECENT;
use crate::server::AppState;
use crate::server::errors::ApiError;
use crate::server::extract::{AdminUser, ApiJson, ApiPath, ApiQuery};
use crate::server::responses::ApiResponse;

/// Public reading, staff publishing.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/recent", get(recent))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementType>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AnnouncementQuery>,
) -> Result<ApiResponse<Vec<AnnouncementView>>, ApiError> {
    let page = Page::new(query.page, query.limit);
    let filter = AnnouncementFilter {
        kind: query.kind,
        priority: query.priority,
        search: query.search,
    };
    let announcements = state.announcements.list(page, &filter).await?;
    Ok(ApiResponse::page(
        format!("Found {} announcements", announcements.items.len()),
        announcements,
    ))
}

pub async fn recent(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> Result<ApiResponse<Vec<AnnouncementView>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT).clamp(1, MAX_LIMIT);
    let announcements = state.announcements.recent(limit).await?;
    Ok(ApiResponse::ok(
        format!("Found {} recent announcements", announcements.len()),
        announcements,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<AnnouncementView>, ApiError> {
    let announcement = state.announcements.get(id).await?;
    Ok(ApiResponse::ok("Announcement found", announcement))
}

pub async fn create(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(input): ApiJson<NewAnnouncement>,
) -> Result<ApiResponse<AnnouncementView>, ApiError> {
    let announcement = state.announcements.create(admin.actor(), input).await?;
    Ok(ApiResponse::created(
        "Announcement created successfully",
        announcement,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
    ApiJson(update): ApiJson<AnnouncementUpdate>,
) -> Result<ApiResponse<AnnouncementView>, ApiError> {
    let announcement = state.announcements.update(id, update).await?;
    Ok(ApiResponse::ok("Announcement updated successfully", announcement))
}

pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<()>, ApiError> {
    state.announcements.delete(id).await?;
    Ok(ApiResponse::message("Announcement deleted successfully"))
}
