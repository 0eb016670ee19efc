//! Content API: public reads of the active portfolio document, admin-only
//! whole-document and per-section writes.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::content::{ContentDocument, Section, SectionValue};
use crate::routes::auth::require_admin;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct UpdateContentResponse {
    pub success: bool,
    pub message: String,
    pub content: ContentDocument,
}

#[derive(Debug, Serialize)]
pub struct UpdateSectionResponse {
    pub success: bool,
    pub message: String,
    pub section: String,
    pub value: SectionValue,
}

fn parse_section(name: &str) -> Result<Section, ApiError> {
    name.parse()
        .map_err(|_| ApiError::NotFound(format!("Section '{}'", name)))
}

/// GET /api/content
///
/// Seeds the fixed default document on first read; the store serializes
/// creation, so concurrent first requests see the same document.
pub async fn get_content(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doc = state.content.get_active().await?;
    Ok(Json(doc))
}

/// GET /api/content/{section}
///
/// Section reads do not seed: before the first whole-document read or
/// write there is nothing to serve, so this is NotFound.
pub async fn get_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let section = parse_section(&name)?;
    let value = state.content.get_section(section).await.map_err(|e| {
        match e {
            StoreError::NotFound => ApiError::NotFound("Active content document".to_string()),
            other => other.into(),
        }
    })?;
    Ok(Json(value))
}

/// PUT /api/content
///
/// Full replace, not a merge: the caller sends the whole document back.
pub async fn put_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ContentDocument>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.auth)?;

    payload.validate().map_err(ApiError::Validation)?;

    let content = state.content.replace_active(payload).await?;
    Ok(Json(UpdateContentResponse {
        success: true,
        message: "Content updated successfully".to_string(),
        content,
    }))
}

/// PUT /api/content/{section}
///
/// Replaces one top-level section and leaves siblings untouched.
pub async fn put_section(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.auth)?;

    let section = parse_section(&name)?;
    let value = section
        .parse_value(payload)
        .map_err(|e| ApiError::Validation(format!("Invalid '{}' payload: {}", section, e)))?;

    let value = state.content.replace_section(value).await.map_err(|e| {
        match e {
            StoreError::NotFound => ApiError::NotFound("Active content document".to_string()),
            other => other.into(),
        }
    })?;

    Ok(Json(UpdateSectionResponse {
        success: true,
        message: format!("Section '{}' updated successfully", section),
        section: section.as_str().to_string(),
        value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::default_document;
    use crate::routes::auth::create_access_token;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn content_router(state: AppState) -> Router {
        Router::new()
            .route("/api/content", get(get_content).put(put_content))
            .route(
                "/api/content/{section}",
                get(get_section).put(put_section),
            )
            .with_state(state)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn put_req(uri: &str, token: Option<&str>, json: &impl serde::Serialize) -> Request<Body> {
        let mut builder = Request::put(uri).header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_content_seeds_default_idempotently() {
        let state = AppState::for_tests();
        let (status, first) = send(content_router(state.clone()), get_req("/api/content")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, second) = send(content_router(state), get_req("/api/content")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);

        let doc: ContentDocument = serde_json::from_slice(&first).unwrap();
        assert_eq!(doc, default_document());
    }

    #[tokio::test]
    async fn test_get_unknown_section_returns_not_found() {
        let state = AppState::for_tests();
        let (status, _) = send(content_router(state), get_req("/api/content/banner")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_section_returns_bare_payload() {
        let state = AppState::for_tests();
        // Seed via the whole-document read first.
        send(content_router(state.clone()), get_req("/api/content")).await;
        let (status, bytes) = send(content_router(state), get_req("/api/content/hero")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["name"], default_document().hero.name);
    }

    #[tokio::test]
    async fn test_get_section_before_seed_is_not_found() {
        let state = AppState::for_tests();
        let (status, _) = send(
            content_router(state.clone()),
            get_req("/api/content/hero"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // The failed section read must not have seeded a document.
        let (status, _) = send(content_router(state), get_req("/api/content/contact")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_content_without_token_is_unauthorized() {
        let state = AppState::for_tests();
        let (status, _) = send(
            content_router(state),
            put_req("/api/content", None, &default_document()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_put_content_round_trips() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();

        let mut doc = default_document();
        doc.hero.name = "New Name".to_string();
        doc.experience.remove(0);
        doc.skills[0].skills.push("Rust".to_string());

        let (status, _) = send(
            content_router(state.clone()),
            put_req("/api/content", Some(&token), &doc),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, bytes) = send(content_router(state), get_req("/api/content")).await;
        let stored: ContentDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stored, doc);
    }

    #[tokio::test]
    async fn test_put_content_rejects_blank_required_field() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();
        let mut doc = default_document();
        doc.hero.title = "".to_string();
        let (status, _) = send(
            content_router(state),
            put_req("/api/content", Some(&token), &doc),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_section_leaves_siblings_byte_identical() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();

        let (_, before) = send(content_router(state.clone()), get_req("/api/content")).await;
        let before: serde_json::Value = serde_json::from_slice(&before).unwrap();

        let mut hero = default_document().hero;
        hero.name = "Edited".to_string();
        let (status, _) = send(
            content_router(state.clone()),
            put_req("/api/content/hero", Some(&token), &hero),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, after) = send(content_router(state), get_req("/api/content")).await;
        let after: serde_json::Value = serde_json::from_slice(&after).unwrap();
        assert_eq!(after["hero"]["name"], "Edited");
        for sibling in ["about", "skills", "projects", "experience", "contact"] {
            assert_eq!(after[sibling], before[sibling], "section {} changed", sibling);
        }
    }

    #[tokio::test]
    async fn test_put_section_without_token_is_unauthorized() {
        let state = AppState::for_tests();
        send(content_router(state.clone()), get_req("/api/content")).await;
        let (status, _) = send(
            content_router(state),
            put_req("/api/content/hero", None, &default_document().hero),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_put_section_with_wrong_key_token_is_unauthorized() {
        let state = AppState::for_tests();
        send(content_router(state.clone()), get_req("/api/content")).await;
        let other = crate::state::AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..(*state.auth).clone()
        };
        let token = create_access_token(&other, "admin").unwrap();

        let (status, _) = send(
            content_router(state.clone()),
            put_req("/api/content/hero", Some(&token), &default_document().hero),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // The rejected write must not have touched the document.
        let (_, bytes) = send(content_router(state), get_req("/api/content")).await;
        let doc: ContentDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc, default_document());
    }

    #[tokio::test]
    async fn test_put_section_unknown_name_is_not_found() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();
        let (status, _) = send(
            content_router(state),
            put_req("/api/content/banner", Some(&token), &serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_section_wrong_shape_is_bad_request() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();
        // Seed first so the failure is validation, not a missing document.
        send(content_router(state.clone()), get_req("/api/content")).await;
        let (status, _) = send(
            content_router(state),
            put_req(
                "/api/content/hero",
                Some(&token),
                &serde_json::json!({ "unexpected": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_section_before_seed_is_not_found() {
        let state = AppState::for_tests();
        let token = create_access_token(&state.auth, "admin").unwrap();
        let (status, _) = send(
            content_router(state),
            put_req(
                "/api/content/hero",
                Some(&token),
                &default_document().hero,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_content_with_wrong_key_token_is_unauthorized() {
        let state = AppState::for_tests();
        let other = crate::state::AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..(*state.auth).clone()
        };
        let token = create_access_token(&other, "admin").unwrap();
        let (status, _) = send(
            content_router(state),
            put_req("/api/content", Some(&token), &default_document()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
