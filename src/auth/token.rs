use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::TokenError;
use crate::domain::models::{Role, User};
use crate::store::Store;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";
const REVOKED_PREFIX: &str = "revoked:";

type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token.
///
/// `id` and `userId` are the same value; both are kept because the web and
/// mobile clients read different ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: u64,
    pub user_id: u64,
    pub email: String,
    pub role: Role,
    pub is_barangay: bool,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Issues, verifies and revokes HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    key: hmac::Key,
    ttl: Duration,
    store: Arc<dyn Store>,
}

impl TokenService {
    pub fn new(secret: &SecretString, ttl: Duration, store: Arc<dyn Store>) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.expose_secret().as_bytes()),
            ttl,
            store,
        }
    }

    /// Issues a token for the user, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            id: user.id,
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            is_barangay: user.is_barangay(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = Header {
            alg: ALGORITHM.to_owned(),
            typ: TOKEN_TYPE.to_owned(),
        };
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = hmac::sign(&self.key, signing_input.as_bytes());

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        ))
    }

    /// Checks structure, signature and expiry of a token without consulting
    /// the revocation list.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)
            .map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signing_input = &token[..token.len() - signature.len() - 1];
        let signature = URL_SAFE_NO_PAD.decode(signature)?;
        hmac::verify(&self.key, signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload)?)
            .map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Fully verifies a presented token, including revocation.
    pub async fn verify(&self, token: &str) -> Result<Claims> {
        let claims = self.decode_at(token, Utc::now())?;
        if self.store.is_marked(&revoked_key(&claims.jti)).await? {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// Revokes a token until its natural expiry.
    pub async fn revoke(&self, claims: &Claims) -> Result<()> {
        let remaining = claims.exp.saturating_sub(Utc::now().timestamp()).max(1);
        self.store
            .mark(&revoked_key(&claims.jti), remaining as u64)
            .await?;
        tracing::info!(user_id = claims.id, "Access token revoked");
        Ok(())
    }
}

fn revoked_key(jti: &str) -> String {
    format!("{REVOKED_PREFIX}{jti}")
}
