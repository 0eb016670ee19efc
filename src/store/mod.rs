//! Storage interfaces for the content document and contact submissions.
//!
//! Handlers receive store handles through [`crate::state::AppState`] rather
//! than reaching for a process-global pool. Two implementations exist: a
//! Postgres one backed by sqlx and an in-memory one used when no database
//! is configured and in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::contact::{ContactStatus, ContactSubmission, NewSubmission};
use crate::models::content::{ContentDocument, Section, SectionValue};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Repository for the single active content document.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Return the active document, seeding the fixed default exactly once
    /// if none exists yet. Concurrent first reads must not create two
    /// active documents.
    async fn get_active(&self) -> Result<ContentDocument, StoreError>;

    /// Overwrite the entire active document (full replace, not a merge),
    /// creating it when none exists. Updates the modification timestamp.
    async fn replace_active(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError>;

    /// Replace one top-level section, leaving siblings untouched. Fails
    /// with `NotFound` when no active document exists.
    async fn replace_section(&self, value: SectionValue) -> Result<SectionValue, StoreError>;

    /// Fetch one top-level section of the active document.
    async fn get_section(&self, section: Section) -> Result<SectionValue, StoreError>;

    /// Connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Repository for contact submissions.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, new: NewSubmission) -> Result<ContactSubmission, StoreError>;

    /// List submissions newest-first, optionally filtered by status.
    /// Returns the page plus the total count matching the filter.
    async fn list(
        &self,
        status: Option<ContactStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<ContactSubmission>, i64), StoreError>;

    async fn set_status(
        &self,
        id: uuid::Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission, StoreError>;

    async fn delete(&self, id: uuid::Uuid) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
