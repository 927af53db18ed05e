use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use chrono::Utc;
use serde::Deserialize;

use crate::domain::catalog::{self, DocumentType};
use crate::domain::models::{
    DocumentRequest, DocumentRequestView, MAX_LIMIT, NewDocumentRequest, Page, RequestFilter,
    RequestStatus,
};
use crate::domain::service::StatusChange;
use crate::domain::stats::DocumentStats;
use crate::server::AppState;
use crate::server::errors::ApiError;
use crate::server::extract::{AdminUser, ApiJson, ApiPath, ApiQuery, AuthUser, OptionalJson};
use crate::server::responses::ApiResponse;

const DEFAULT_MY_REQUESTS: usize = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/types", get(types))
        .route("/my-requests", get(my_requests))
        .route("/requests", get(list).post(create))
        .route("/requests/pending", get(pending))
        .route("/requests/{id}", get(show).delete(remove))
        .route("/requests/{id}/status", put(update_status))
        .route("/requests/{id}/approve", put(approve))
        .route("/requests/{id}/reject", put(reject))
        .route("/statistics", get(statistics))
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub document_type: Option<String>,
}

impl RequestQuery {
    fn filter(self) -> Result<RequestFilter, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(status) => Some(status.parse::<RequestStatus>()?),
        };
        Ok(RequestFilter {
            status,
            user_id: None,
            document_type: self.document_type.filter(|t| !t.trim().is_empty()),
            search: self.search,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApprovalBody {
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectionBody {
    pub reason: Option<String>,
}

pub async fn types() -> ApiResponse<&'static [DocumentType]> {
    ApiResponse::ok(
        "Document types retrieved successfully",
        catalog::document_types(),
    )
}

pub async fn my_requests(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<ApiResponse<Vec<DocumentRequestView>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_MY_REQUESTS).clamp(1, MAX_LIMIT);
    let requests = state.documents.my_requests(user.actor(), limit).await?;
    Ok(ApiResponse::ok(
        format!("Found {} document requests", requests.len()),
        requests,
    ))
}

pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<RequestQuery>,
) -> Result<ApiResponse<Vec<DocumentRequestView>>, ApiError> {
    let page = Page::new(query.page, query.limit);
    let filter = query.filter()?;
    let requests = state.documents.list(page, &filter).await?;
    Ok(ApiResponse::page(
        format!("Found {} document requests", requests.items.len()),
        requests,
    ))
}

pub async fn pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<ApiResponse<Vec<DocumentRequestView>>, ApiError> {
    let requests = state.documents.pending().await?;
    Ok(ApiResponse::ok(
        format!("Found {} pending requests", requests.len()),
        requests,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<DocumentRequestView>, ApiError> {
    let request = state.documents.get(user.actor(), id).await?;
    Ok(ApiResponse::ok("Document request found", request))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewDocumentRequest>,
) -> Result<ApiResponse<DocumentRequest>, ApiError> {
    let request = state.documents.create(user.actor(), input).await?;
    Ok(ApiResponse::created(
        "Document request created successfully",
        request,
    ))
}

pub async fn update_status(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<ApiResponse<DocumentRequestView>, ApiError> {
    let request = state
        .documents
        .update_status(admin.actor(), id, change)
        .await?;
    Ok(ApiResponse::ok("Request status updated successfully", request))
}

pub async fn approve(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
    OptionalJson(body): OptionalJson<ApprovalBody>,
) -> Result<ApiResponse<DocumentRequestView>, ApiError> {
    let request = state
        .documents
        .approve(admin.actor(), id, body.remarks)
        .await?;
    Ok(ApiResponse::ok("Request approved successfully", request))
}

pub async fn reject(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(id): ApiPath<u64>,
    OptionalJson(body): OptionalJson<RejectionBody>,
) -> Result<ApiResponse<DocumentRequestView>, ApiError> {
    let request = state
        .documents
        .reject(admin.actor(), id, body.reason)
        .await?;
    Ok(ApiResponse::ok("Request rejected successfully", request))
}

pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<DocumentStats>, ApiError> {
    let stats = state.documents.statistics(user.actor(), Utc::now()).await?;
    Ok(ApiResponse::ok("Statistics retrieved successfully", stats))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<ApiResponse<()>, ApiError> {
    state.documents.delete(user.actor(), id).await?;
    Ok(ApiResponse::message("Document request deleted successfully"))
}
