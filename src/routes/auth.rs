//! Admin authentication: login issues a signed bearer token for the single
//! admin account, verify checks one.

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::state::{AppState, AuthConfig};

lazy_static::lazy_static! {
    /// Rate limit storage (IP -> last login attempt timestamp)
    static ref RATE_LIMIT: Arc<RwLock<HashMap<String, i64>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Token lifetime. The token is the only credential the dashboard holds.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// One login attempt per IP per window.
#[allow(dead_code)]
const RATE_LIMIT_WINDOW_SECS: i64 = 5;

// ============================================================================
// Types
// ============================================================================

/// JWT claims carried by the bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Admin identity returned to the dashboard. Never includes the hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminInfo {
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminInfo>,
}

// ============================================================================
// Token helpers
// ============================================================================

/// Create a signed access token for the admin identity.
pub fn create_access_token(
    auth: &AuthConfig,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::days(TOKEN_EXPIRY_DAYS);

    let claims = Claims {
        sub: "admin".to_string(),
        username: username.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
}

/// Verify and decode an access token. Rejects expiry and bad signatures.
pub fn verify_access_token(
    token: &str,
    auth: &AuthConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Gate for admin-only handlers. Runs before any data access.
pub fn require_admin(headers: &HeaderMap, auth: &AuthConfig) -> Result<Claims, ApiError> {
    let token = extract_bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    let claims = verify_access_token(token, auth).map_err(|e| {
        tracing::debug!("token verification failed: {}", e);
        ApiError::Unauthorized
    })?;
    if claims.username != auth.admin_username {
        return Err(ApiError::Unauthorized);
    }
    Ok(claims)
}

/// Check rate limit for an IP, evicting stale entries so the map stays
/// proportional to active IPs.
async fn check_rate_limit(ip: &str) -> bool {
    #[cfg(test)]
    {
        let _ = ip;
        return true; // Bypass in tests so validation and credentials are exercised
    }

    #[cfg(not(test))]
    {
        let now = Utc::now().timestamp();
        let mut limits = RATE_LIMIT.write().await;

        limits.retain(|_, last| now - *last < RATE_LIMIT_WINDOW_SECS);

        if let Some(last_request) = limits.get(ip) {
            if now - last_request < RATE_LIMIT_WINDOW_SECS {
                return false;
            }
        }

        limits.insert(ip.to_string(), now);
        true
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let ip = addr.ip().to_string();
    if !check_rate_limit(&ip).await {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "success": false,
                "message": "Too many requests. Please try again later."
            })),
        )
            .into_response());
    }

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Please provide username and password".to_string(),
        ));
    }

    // The same generic failure covers both an unknown username and a wrong
    // password, to avoid account enumeration.
    if payload.username != state.auth.admin_username {
        tracing::warn!("login attempt for unknown user");
        return Err(ApiError::Unauthorized);
    }

    // bcrypt is CPU-bound; keep the async executor free.
    let password = payload.password;
    let hash = state.auth.admin_password_hash.clone();
    let password_ok =
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false);
    if !password_ok {
        tracing::warn!("failed login attempt for admin account");
        return Err(ApiError::Unauthorized);
    }

    let token = create_access_token(&state.auth, &payload.username).map_err(|e| {
        tracing::error!("failed to create access token: {}", e);
        ApiError::Dependency(e.to_string())
    })?;

    tracing::info!("successful admin login");

    Ok(Json(LoginResponse {
        success: true,
        token,
        admin: AdminInfo {
            username: payload.username,
        },
    })
    .into_response())
}

/// POST /api/auth/verify
pub async fn verify_token(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match require_admin(&headers, &state.auth) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                valid: true,
                admin: Some(AdminInfo {
                    username: claims.username,
                }),
            }),
        ),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                valid: false,
                admin: None,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    fn auth_router(state: AppState) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/verify", post(verify_token))
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 12345))))
            .with_state(state)
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &impl serde::Serialize,
    ) -> (StatusCode, axum::body::Bytes) {
        let body = Body::from(serde_json::to_vec(json).unwrap());
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_empty_fields_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(AppState::for_tests()),
            "/api/auth/login",
            &request("", ""),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_unknown_user_returns_unauthorized() {
        let (status, _) = post_json(
            auth_router(AppState::for_tests()),
            "/api/auth/login",
            &request("nobody", "admin123"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_wrong_password_returns_unauthorized() {
        let (status, bytes) = post_json(
            auth_router(AppState::for_tests()),
            "/api/auth/login",
            &request("admin", "wrongpassword"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        // Same body as unknown user: no enumeration hints.
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_success_returns_token() {
        let (status, bytes) = post_json(
            auth_router(AppState::for_tests()),
            "/api/auth/login",
            &request("admin", "admin123"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: LoginResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.success);
        assert!(!body.token.is_empty());
        assert_eq!(body.admin.username, "admin");
    }

    #[tokio::test]
    async fn test_verify_without_token_returns_unauthorized() {
        let app = auth_router(AppState::for_tests());
        let req = Request::post("/api/auth/verify").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: VerifyResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.valid);
    }

    #[tokio::test]
    async fn test_verify_valid_token_returns_identity() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();
        let app = auth_router(state);
        let req = Request::post("/api/auth/verify")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: VerifyResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.valid);
        assert_eq!(body.admin.unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_verify_token_signed_with_other_key_fails() {
        let state = AppState::for_tests();
        let other = AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..(*state.auth).clone()
        };
        let token = create_access_token(&other, "admin").unwrap();
        assert!(verify_access_token(&token, &state.auth).is_err());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let state = AppState::for_tests();
        let now = Utc::now();
        let claims = Claims {
            sub: "admin".to_string(),
            username: "admin".to_string(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_access_token(&token, &state.auth).is_err());
    }
}
