use axum::{Json, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub async fn health_check() -> impl IntoResponse {
    "healthy"
}

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn api_test() -> Json<ServerStatus> {
    Json(ServerStatus {
        success: true,
        message: "Server is working!",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(
            response.into_response().status(),
            axum::http::StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_api_test() {
        let Json(status) = api_test().await;
        assert!(status.success);
        assert_eq!(status.message, "Server is working!");
    }
}
