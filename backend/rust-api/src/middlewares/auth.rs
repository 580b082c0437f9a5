use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::AppState;

/// Lifetime of a dashboard unlock token issued after a successful PIN
/// check.
pub const DASHBOARD_TOKEN_TTL_SECONDS: i64 = 30 * 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardClaims {
    pub sub: String, // always "parent"; the app has a single guardian
    pub exp: usize,  // expiration timestamp
    pub iat: usize,  // issued at timestamp
}

#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    MissingToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token expired"),
            AuthError::MissingToken => write!(f, "Missing authorization token"),
        }
    }
}

impl std::error::Error for AuthError {}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_dashboard_token(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = DashboardClaims {
            sub: "parent".to_string(),
            exp: (now + DASHBOARD_TOKEN_TTL_SECONDS) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| AuthError::InvalidToken)
    }

    pub fn validate_token(&self, token: &str) -> Result<DashboardClaims, AuthError> {
        decode::<DashboardClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                if e.to_string().contains("ExpiredSignature") {
                    AuthError::ExpiredToken
                } else {
                    AuthError::InvalidToken
                }
            })
    }
}

/// Guards the parent dashboard routes with the PIN-unlock bearer token.
pub async fn dashboard_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state.jwt.validate_token(token).map_err(|e| {
        tracing::warn!("Dashboard token validation failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let service = JwtService::new("test-secret");
        let token = service.issue_dashboard_token().unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "parent");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");

        let token = issuer.issue_dashboard_token().unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtService::new("test-secret");
        assert!(service.validate_token("not-a-token").is_err());
    }
}
