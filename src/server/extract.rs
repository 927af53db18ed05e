//! Request extractors that reject with the JSON error envelope.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
    },
};
use serde::de::DeserializeOwned;

use crate::auth::{Claims, TokenError};
use crate::domain::service::Actor;
use crate::server::AppState;
use crate::server::errors::{ADMIN_REQUIRED, ApiError};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// A JSON body that may be left out entirely.
///
/// A request without `Content-Type` and with an empty body yields
/// `T::default()`. Anything else is parsed like [`ApiJson`].
#[derive(Debug)]
pub struct OptionalJson<T>(pub T);

impl<S, T> FromRequest<S> for OptionalJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(CONTENT_TYPE) {
            let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
            return Ok(OptionalJson(value));
        }

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
        })?;
        if body.iter().all(u8::is_ascii_whitespace) {
            Ok(OptionalJson(T::default()))
        } else {
            Err(ApiError::BadRequest(
                "Invalid request body: Expected request with `Content-Type: application/json`"
                    .into(),
            ))
        }
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::MissingToken)?;
        let claims = match state.tokens.verify(token).await {
            Ok(claims) => claims,
            Err(TokenError::Store(e)) => return Err(ApiError::internal(e)),
            Err(e) => {
                tracing::debug!("Rejected access token: {e}");
                return Err(ApiError::InvalidToken);
            }
        };

        // Tokens outlive deleted accounts
        if state.users.get(claims.id).await?.is_none() {
            tracing::debug!("Rejected access token of deleted user {}", claims.id);
            return Err(ApiError::InvalidToken);
        }
        Ok(AuthUser(claims))
    }
}

/// A caller with the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl AdminUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(ApiError::Forbidden(ADMIN_REQUIRED.into()));
        }
        Ok(AdminUser(claims))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
