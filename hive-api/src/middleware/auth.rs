//! JWT authentication middleware.
//!
//! Validates bearer tokens and stores the claims in request extensions
//! for downstream handlers; role checks happen at the handler seam via
//! [`authorize`].

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use hive_core::types::{Role, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HS256
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self { secret: secret.into(), expiry_hours }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

impl AuthClaims {
    pub fn user_id(&self) -> ApiResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::Unauthorized("malformed subject claim".to_string()))
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Check the caller's role against the allowed set and return their id.
pub fn authorize(claims: &AuthClaims, allowed: &[Role]) -> ApiResult<Uuid> {
    let role = claims
        .role()
        .ok_or_else(|| ApiError::Unauthorized(format!("unknown role: {}", claims.role)))?;
    if !allowed.contains(&role) {
        return Err(ApiError::Forbidden(format!(
            "role {} may not perform this operation",
            role.as_str()
        )));
    }
    claims.user_id()
}

/// Issue a signed token for a verified user.
pub fn issue_token(user: &User, config: &JwtConfig) -> ApiResult<String> {
    let now = Utc::now();
    let claims = AuthClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (now + chrono::Duration::hours(config.expiry_hours)).timestamp() as u64,
        iat: now.timestamp() as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Extract the token from an Authorization header value.
pub fn extract_token(auth_header: &str) -> ApiResult<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "invalid authorization header format, expected: Bearer <token>".to_string(),
            )
        })
}

/// Validate a token and extract its claims.
pub fn validate_token(token: &str, config: &JwtConfig) -> ApiResult<AuthClaims> {
    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let token_data = decode::<AuthClaims>(token, &key, &validation).map_err(|e| {
        if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
            ApiError::Unauthorized("token has expired".to_string())
        } else {
            ApiError::Unauthorized(format!("token validation failed: {e}"))
        }
    })?;

    Ok(token_data.claims)
}

/// Require authentication middleware
///
/// Validates the JWT token and stores claims in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authorization header is required".to_string()))?;

    let token = extract_token(auth_header)?;
    let claims = validate_token(token, &state.jwt)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "t@hive.test".into(),
            password_hash: "x".into(),
            role,
            display_name: "T".into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn extract_token_requires_bearer_scheme() {
        assert!(extract_token("Bearer abc123").is_ok());
        assert!(extract_token("Basic abc123").is_err());
        assert!(extract_token("abc123").is_err());
    }

    #[test]
    fn issued_token_round_trips() {
        let config = JwtConfig::new("test-secret-for-unit-testing-only-123456", 1);
        let user = test_user(Role::Triager);
        let token = issue_token(&user, &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "triager");
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = JwtConfig::new("test-secret-for-unit-testing-only-123456", 1);
        let other = JwtConfig::new("another-secret-entirely-for-testing-9999", 1);
        let token = issue_token(&test_user(Role::Admin), &config).unwrap();
        assert!(matches!(
            validate_token(&token, &other),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn authorize_gates_on_role() {
        let config = JwtConfig::new("test-secret-for-unit-testing-only-123456", 1);
        let user = test_user(Role::Auditor);
        let token = issue_token(&user, &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();

        assert!(authorize(&claims, &[Role::Admin, Role::Auditor]).is_ok());
        assert!(matches!(
            authorize(&claims, &[Role::Admin, Role::Triager]),
            Err(ApiError::Forbidden(_))
        ));
    }
}
