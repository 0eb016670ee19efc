//! Contact form intake (public) and moderation (admin-only).
//!
//! Intake persists first and notifies second: a dead mail transport can
//! cost a notification but never a stored submission.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::contact::{ContactStatus, ContactSubmission, NewSubmission};
use crate::routes::auth::require_admin;
use crate::state::AppState;
use crate::store::StoreError;

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 100;

lazy_static::lazy_static! {
    /// Basic local@domain.tld shape; not a full RFC 5322 parser.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedContact {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub contact: SubmittedContact,
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub skip: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub success: bool,
    pub contacts: Vec<ContactSubmission>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    pub contact: ContactSubmission,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_submission(payload: ContactRequest) -> Result<NewSubmission, ApiError> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let subject = payload.subject.trim().to_string();
    let message = payload.message.trim().to_string();

    if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
        return Err(ApiError::Validation(
            "Please provide all required fields: name, email, subject, and message".to_string(),
        ));
    }
    if !EMAIL_REGEX.is_match(&email) {
        return Err(ApiError::Validation(
            "Please provide a valid email address".to_string(),
        ));
    }

    Ok(NewSubmission {
        name,
        email,
        subject,
        message,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/contact
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = validate_submission(payload)?;
    let submission = state.contacts.insert(new).await?;

    // Fire-and-forget: the response does not wait on delivery, and a
    // transport failure never unwinds the stored submission.
    let notifier = state.notifier.clone();
    let notify_copy = submission.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.contact_received(&notify_copy).await {
            tracing::error!(id = %notify_copy.id, "contact notification failed: {}", e);
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: "Thank you for your message! I will get back to you soon.".to_string(),
            contact: SubmittedContact {
                id: submission.id,
                name: submission.name,
                created_at: submission.created_at,
            },
        }),
    ))
}

/// GET /api/contact?status=&limit=&skip=
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.auth)?;

    // An unrecognized status filter matches nothing it should, so it is
    // ignored rather than rejected.
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<ContactStatus>().ok());
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let skip = query.skip.unwrap_or(0).max(0);

    let (contacts, total) = state.contacts.list(status, limit, skip).await?;
    let has_more = total > skip + contacts.len() as i64;

    Ok(Json(ContactListResponse {
        success: true,
        contacts,
        pagination: Pagination {
            total,
            limit,
            skip,
            has_more,
        },
    }))
}

/// PATCH /api/contact/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.auth)?;

    let status: ContactStatus = payload.status.parse().map_err(|_| {
        ApiError::Validation("Invalid status. Must be one of: new, read, responded".to_string())
    })?;

    let contact = state
        .contacts
        .set_status(id, status)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Contact".to_string()),
            other => other.into(),
        })?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Contact status updated".to_string(),
        contact,
    }))
}

/// DELETE /api/contact/{id}
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.auth)?;

    state.contacts.delete(id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Contact".to_string()),
        other => other.into(),
    })?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Contact deleted successfully".to_string(),
    }))
}
