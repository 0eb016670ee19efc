//! In-memory stores. Used when no `DATABASE_URL` is configured (the server
//! stays usable in dev, like the no-database fallback mode) and as test
//! fixtures. Contents do not survive a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContactStore, ContentStore, StoreError};
use crate::models::contact::{ContactStatus, ContactSubmission, NewSubmission};
use crate::models::content::{default_document, ContentDocument, Section, SectionValue};

struct ActiveDocument {
    doc: ContentDocument,
    updated_at: DateTime<Utc>,
}

/// Single-document content store guarded by an RwLock. Seeding happens
/// under the write lock, so concurrent first reads create exactly one
/// document.
#[derive(Default)]
pub struct MemoryContentStore {
    active: RwLock<Option<ActiveDocument>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get_active(&self) -> Result<ContentDocument, StoreError> {
        {
            let guard = self.active.read().await;
            if let Some(active) = guard.as_ref() {
                return Ok(active.doc.clone());
            }
        }

        // Re-check under the write lock: another task may have seeded
        // between the read and the write acquisition.
        let mut guard = self.active.write().await;
        if let Some(active) = guard.as_ref() {
            return Ok(active.doc.clone());
        }
        let doc = default_document();
        *guard = Some(ActiveDocument {
            doc: doc.clone(),
            updated_at: Utc::now(),
        });
        tracing::info!("seeded default content document");
        Ok(doc)
    }

    async fn replace_active(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError> {
        let mut guard = self.active.write().await;
        *guard = Some(ActiveDocument {
            doc: doc.clone(),
            updated_at: Utc::now(),
        });
        Ok(doc)
    }

    async fn replace_section(&self, value: SectionValue) -> Result<SectionValue, StoreError> {
        let mut guard = self.active.write().await;
        let active = guard.as_mut().ok_or(StoreError::NotFound)?;
        active.doc.set_section(value.clone());
        active.updated_at = Utc::now();
        Ok(value)
    }

    async fn get_section(&self, section: Section) -> Result<SectionValue, StoreError> {
        // Unlike get_active, a section read never seeds: no document means
        // NotFound, same as replace_section.
        let guard = self.active.read().await;
        let active = guard.as_ref().ok_or(StoreError::NotFound)?;
        Ok(active.doc.section(section))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory submission store. Insertion order is chronological, so the
/// newest-first listing is the reversed vector and stays stable across
/// calls absent intervening writes.
#[derive(Default)]
pub struct MemoryContactStore {
    submissions: RwLock<Vec<ContactSubmission>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, new: NewSubmission) -> Result<ContactSubmission, StoreError> {
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        self.submissions.write().await.push(submission.clone());
        Ok(submission)
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<ContactSubmission>, i64), StoreError> {
        let guard = self.submissions.read().await;
        let matching: Vec<&ContactSubmission> = guard
            .iter()
            .rev()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission, StoreError> {
        let mut guard = self.submissions.write().await;
        let submission = guard
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        submission.status = status;
        Ok(submission.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.submissions.write().await;
        let before = guard.len();
        guard.retain(|s| s.id != id);
        if guard.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
