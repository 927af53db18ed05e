use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::{Role, User};
use crate::domain::service::{BarangayRegistration, Credentials, PasswordChange, Registration};
use crate::server::AppState;
use crate::server::errors::ApiError;
use crate::server::extract::{AdminUser, ApiJson, AuthUser};
use crate::server::responses::ApiResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify))
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/barangays", post(create_barangay).get(list_barangays))
}

/// An account as the portals expect it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub name: String,
    pub email: String,
    pub user_type: &'static str,
    pub role: Role,
    pub is_barangay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AccountView {
    fn of(user: &User) -> Self {
        let (first_name, last_name) = if user.is_barangay() {
            (None, None)
        } else {
            let (first, last) = user.first_and_last_name();
            (Some(first), Some(last))
        };
        Self {
            id: user.id,
            first_name,
            last_name,
            name: user.name.clone(),
            email: user.email.clone(),
            user_type: user.role.user_type(),
            role: user.role,
            is_barangay: user.is_barangay(),
            created_at: None,
        }
    }

    fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarangayView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for BarangayView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
struct UserEnvelope {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    user: AccountView,
}

#[derive(Serialize)]
struct BarangayEnvelope {
    success: bool,
    message: String,
    barangay: BarangayView,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Registration>,
) -> Result<Response, ApiError> {
    let user = state.users.register_resident(input).await?;
    let body = UserEnvelope {
        success: true,
        message: "Resident account created successfully".into(),
        token: None,
        user: AccountView::of(&user).with_created_at(user.created_at),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Credentials>,
) -> Result<Response, ApiError> {
    let user = state.users.authenticate(input).await?;
    let token = state.tokens.issue(&user).map_err(ApiError::internal)?;

    let message = if user.is_barangay() {
        format!("Welcome to {} Dashboard", user.name)
    } else {
        "Welcome to Resident Portal".to_owned()
    };
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    let body = UserEnvelope {
        success: true,
        message,
        token: Some(token),
        user: AccountView::of(&user),
    };
    Ok(Json(body).into_response())
}

pub async fn verify(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Response, ApiError> {
    let user = state
        .users
        .get(claims.id)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    let body = UserEnvelope {
        success: true,
        message: "Token is valid".into(),
        token: None,
        user: AccountView::of(&user).with_created_at(user.created_at),
    };
    Ok(Json(body).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<ApiResponse<()>, ApiError> {
    state
        .tokens
        .revoke(&claims)
        .await
        .map_err(ApiError::internal)?;
    Ok(ApiResponse::message("Logged out successfully"))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(input): ApiJson<PasswordChange>,
) -> Result<ApiResponse<()>, ApiError> {
    state.users.change_password(claims.id, input).await?;
    Ok(ApiResponse::message("Password changed successfully"))
}

pub async fn create_barangay(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(input): ApiJson<BarangayRegistration>,
) -> Result<Response, ApiError> {
    let user = state.users.register_barangay(input).await?;
    let body = BarangayEnvelope {
        success: true,
        message: format!("Barangay account for {} created successfully", user.name),
        barangay: BarangayView::from(&user),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn list_barangays(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<ApiResponse<Vec<BarangayView>>, ApiError> {
    let barangays: Vec<_> = state
        .users
        .list_barangays()
        .await?
        .iter()
        .map(|profile| BarangayView {
            id: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
            created_at: profile.created_at,
        })
        .collect();
    Ok(ApiResponse::ok(
        format!("Found {} barangay accounts", barangays.len()),
        barangays,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ResidentDetails;

    fn user(role: Role, name: &str) -> User {
        let now = Utc::now();
        User {
            id: 3,
            name: name.into(),
            email: "someone@example.ph".into(),
            password_hash: "hash".into(),
            role,
            details: ResidentDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resident_account_view() {
        let json =
            serde_json::to_value(AccountView::of(&user(Role::Resident, "Juan Dela Cruz"))).unwrap();
        assert_eq!(json["firstName"], "Juan");
        assert_eq!(json["lastName"], "Dela Cruz");
        assert_eq!(json["userType"], "resident");
        assert_eq!(json["isBarangay"], false);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_barangay_account_view() {
        let json =
            serde_json::to_value(AccountView::of(&user(Role::Admin, "Barangay Tabao"))).unwrap();
        assert!(json.get("firstName").is_none());
        assert_eq!(json["userType"], "barangay");
        assert_eq!(json["role"], "admin");
        assert_eq!(json["isBarangay"], true);
    }
}
