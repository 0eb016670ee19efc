//! Admin editing session: a client-local draft of the active content
//! document, reconciled against the server in one direction only. The
//! server is loaded into the draft on entry, and the whole draft is
//! pushed back on save; drafts are never merged.
//!
//! Field edits are pure in-memory mutations; nothing touches the network
//! until `save()`. A failed save keeps the draft byte-for-byte intact so
//! the admin can retry wholesale.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;

use crate::models::content::{default_document, ContentDocument, SectionValue};

/// Timeout for editor-side calls; a hung save surfaces as retryable
/// instead of blocking the dashboard.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("not authorized")]
    Unauthorized,
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Whether retrying the same call wholesale can succeed. An
    /// Unauthorized failure needs a fresh login first.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ClientError::Unauthorized)
    }
}

/// Where the session sits relative to the server copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Loading,
    /// Draft equals the session baseline: the last known server state,
    /// or the local fallback adopted after a failed load (flagged by
    /// `EditingSession::load_failed`).
    Synced,
    /// Draft has unsaved edits.
    Dirty,
    Saving,
    /// The last save failed; the unsaved draft is retained.
    SaveFailed,
}

/// Transport the session loads from and saves through.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn fetch(&self) -> Result<ContentDocument, ClientError>;
    async fn push(&self, doc: &ContentDocument) -> Result<ContentDocument, ClientError>;
}

/// Local persisted copy of the last successfully saved draft. Used as a
/// fallback when the server cannot be reached on load.
pub trait DraftBackup: Send + Sync {
    fn restore(&self) -> Option<ContentDocument>;
    fn persist(&self, doc: &ContentDocument);
}

pub struct EditingSession {
    client: Arc<dyn ContentClient>,
    backup: Arc<dyn DraftBackup>,
    state: SessionState,
    draft: ContentDocument,
    load_failed: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl EditingSession {
    pub fn new(client: Arc<dyn ContentClient>, backup: Arc<dyn DraftBackup>) -> Self {
        Self {
            client,
            backup,
            state: SessionState::Unloaded,
            draft: default_document(),
            load_failed: false,
            last_saved_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &ContentDocument {
        &self.draft
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// True while the draft baseline is a local fallback rather than the
    /// server copy. Cleared by a successful load or save.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Load the server copy into the draft.
    ///
    /// On failure the session stays usable: the draft falls back to the
    /// local backup if one exists, else the fixed default, and the error
    /// is returned as an indicator for the caller to surface.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Loading;
        match self.client.fetch().await {
            Ok(doc) => {
                self.draft = doc;
                self.load_failed = false;
                self.state = SessionState::Synced;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("content load failed, using local fallback: {}", e);
                self.draft = self.backup.restore().unwrap_or_else(default_document);
                self.load_failed = true;
                self.state = SessionState::Synced;
                Err(e)
            }
        }
    }

    /// Apply a field-level edit to the draft. No network call occurs;
    /// the session just becomes (or stays) Dirty.
    pub fn edit(&mut self, f: impl FnOnce(&mut ContentDocument)) {
        f(&mut self.draft);
        self.mark_dirty();
    }

    /// Replace one section of the draft. Adding or removing a repeated
    /// sub-item goes through here or `edit`; both are plain draft
    /// mutations.
    pub fn update_section(&mut self, value: SectionValue) {
        self.draft.set_section(value);
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        if matches!(self.state, SessionState::Synced | SessionState::SaveFailed) {
            self.state = SessionState::Dirty;
        }
    }

    /// Commit the entire draft to the server.
    ///
    /// Meaningful only from Dirty or SaveFailed; anywhere else it is a
    /// no-op. On failure the draft is kept unmodified and the session
    /// moves to SaveFailed so the same draft can be retried.
    pub async fn save(&mut self) -> Result<(), ClientError> {
        if !matches!(self.state, SessionState::Dirty | SessionState::SaveFailed) {
            return Ok(());
        }

        self.state = SessionState::Saving;
        match self.client.push(&self.draft).await {
            Ok(saved) => {
                self.draft = saved;
                self.backup.persist(&self.draft);
                self.last_saved_at = Some(Utc::now());
                // The server now holds this draft, so any fallback
                // baseline from a failed load is superseded.
                self.load_failed = false;
                self.state = SessionState::Synced;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::SaveFailed;
                Err(e)
            }
        }
    }
}

// ============================================================================
// HTTP transport
// ============================================================================

#[derive(Debug, Deserialize)]
struct PushResponse {
    content: ContentDocument,
}

/// `ContentClient` over the real HTTP API.
pub struct HttpContentClient {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpContentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    /// Install the bearer token from a successful login.
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    /// Drop the stored credential on logout. An unsaved draft held by an
    /// `EditingSession` is unaffected.
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn map_error(e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl ContentClient for HttpContentClient {
    async fn fetch(&self) -> Result<ContentDocument, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/content", self.base_url))
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "content read returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(Self::map_error)
    }

    async fn push(&self, doc: &ContentDocument) -> Result<ContentDocument, ClientError> {
        let mut request = self
            .client
            .put(format!("{}/api/content", self.base_url))
            .json(doc);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Self::map_error)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "content write returned {}",
                response.status()
            )));
        }

        let body: PushResponse = response.json().await.map_err(Self::map_error)?;
        Ok(body.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockClient {
        fetch_results: Mutex<VecDeque<Result<ContentDocument, ClientError>>>,
        push_results: Mutex<VecDeque<Result<(), ClientError>>>,
        pushed: Mutex<Vec<ContentDocument>>,
    }

    impl MockClient {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fetch_results: Mutex::new(VecDeque::new()),
                push_results: Mutex::new(VecDeque::new()),
                pushed: Mutex::new(Vec::new()),
            })
        }

        fn queue_fetch(&self, result: Result<ContentDocument, ClientError>) {
            self.fetch_results.lock().unwrap().push_back(result);
        }

        fn queue_push(&self, result: Result<(), ClientError>) {
            self.push_results.lock().unwrap().push_back(result);
        }

        fn pushed(&self) -> Vec<ContentDocument> {
            self.pushed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentClient for MockClient {
        async fn fetch(&self) -> Result<ContentDocument, ClientError> {
            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(default_document()))
        }

        async fn push(&self, doc: &ContentDocument) -> Result<ContentDocument, ClientError> {
            self.pushed.lock().unwrap().push(doc.clone());
            match self.push_results.lock().unwrap().pop_front() {
                Some(Ok(())) | None => Ok(doc.clone()),
                Some(Err(e)) => Err(e),
            }
        }
    }

    struct MockBackup {
        stored: Mutex<Option<ContentDocument>>,
    }

    impl MockBackup {
        fn empty() -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(None),
            })
        }

        fn with(doc: ContentDocument) -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(Some(doc)),
            })
        }

        fn stored(&self) -> Option<ContentDocument> {
            self.stored.lock().unwrap().clone()
        }
    }

    impl DraftBackup for MockBackup {
        fn restore(&self) -> Option<ContentDocument> {
            self.stored.lock().unwrap().clone()
        }

        fn persist(&self, doc: &ContentDocument) {
            *self.stored.lock().unwrap() = Some(doc.clone());
        }
    }

    fn server_doc() -> ContentDocument {
        let mut doc = default_document();
        doc.hero.name = "Server Copy".to_string();
        doc
    }

    #[tokio::test]
    async fn test_load_success_syncs_draft_to_server() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client, MockBackup::empty());

        assert_eq!(session.state(), SessionState::Unloaded);
        session.load().await.unwrap();
        assert_eq!(session.state(), SessionState::Synced);
        assert_eq!(session.draft().hero.name, "Server Copy");
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_backup_and_stays_usable() {
        let client = MockClient::new();
        client.queue_fetch(Err(ClientError::Timeout));
        let mut backup_doc = default_document();
        backup_doc.hero.name = "Backed Up".to_string();
        let mut session = EditingSession::new(client, MockBackup::with(backup_doc));

        let err = session.load().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.state(), SessionState::Synced);
        assert!(session.load_failed());
        assert_eq!(session.draft().hero.name, "Backed Up");

        // Still editable after the failed load.
        session.edit(|d| d.hero.title = "Edited".to_string());
        assert_eq!(session.state(), SessionState::Dirty);
    }

    #[tokio::test]
    async fn test_load_failed_flag_clears_on_successful_save() {
        let client = MockClient::new();
        client.queue_fetch(Err(ClientError::Timeout));
        let mut session = EditingSession::new(client, MockBackup::empty());

        assert!(session.load().await.is_err());
        assert!(session.load_failed());

        // Saving the draft makes it the server copy, so the fallback
        // indicator goes away.
        session.edit(|d| d.hero.name = "Recovered".to_string());
        session.save().await.unwrap();
        assert!(!session.load_failed());
        assert_eq!(session.state(), SessionState::Synced);
    }

    #[tokio::test]
    async fn test_load_failed_flag_clears_on_successful_reload() {
        let client = MockClient::new();
        client.queue_fetch(Err(ClientError::Timeout));
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client, MockBackup::empty());

        assert!(session.load().await.is_err());
        assert!(session.load_failed());

        session.load().await.unwrap();
        assert!(!session.load_failed());
        assert_eq!(session.draft().hero.name, "Server Copy");
    }

    #[tokio::test]
    async fn test_load_failure_without_backup_uses_default() {
        let client = MockClient::new();
        client.queue_fetch(Err(ClientError::Transport("connection refused".into())));
        let mut session = EditingSession::new(client, MockBackup::empty());

        assert!(session.load().await.is_err());
        assert_eq!(*session.draft(), default_document());
    }

    #[tokio::test]
    async fn test_edit_marks_dirty_idempotently() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client, MockBackup::empty());
        session.load().await.unwrap();

        session.edit(|d| d.hero.name = "One".to_string());
        assert_eq!(session.state(), SessionState::Dirty);
        session.edit(|d| d.hero.name = "Two".to_string());
        assert_eq!(session.state(), SessionState::Dirty);
        assert_eq!(session.draft().hero.name, "Two");
    }

    #[tokio::test]
    async fn test_adding_list_items_is_a_draft_mutation() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client.clone(), MockBackup::empty());
        session.load().await.unwrap();

        session.edit(|d| d.skills[0].skills.push("Rust".to_string()));
        session.edit(|d| {
            d.experience.remove(0);
        });
        assert_eq!(session.state(), SessionState::Dirty);
        // Nothing has gone over the wire yet.
        assert!(client.pushed().is_empty());
    }

    #[tokio::test]
    async fn test_save_from_synced_is_a_no_op() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client.clone(), MockBackup::empty());
        session.load().await.unwrap();

        session.save().await.unwrap();
        assert_eq!(session.state(), SessionState::Synced);
        assert!(client.pushed().is_empty());
    }

    #[tokio::test]
    async fn test_save_success_pushes_whole_draft_and_persists_backup() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let backup = MockBackup::empty();
        let mut session = EditingSession::new(client.clone(), backup.clone());
        session.load().await.unwrap();

        session.edit(|d| d.hero.name = "Edited".to_string());
        session.save().await.unwrap();

        assert_eq!(session.state(), SessionState::Synced);
        assert!(session.last_saved_at().is_some());
        let pushed = client.pushed();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].hero.name, "Edited");
        assert_eq!(backup.stored().unwrap().hero.name, "Edited");
    }

    #[tokio::test]
    async fn test_save_failure_retains_draft_and_allows_retry() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        client.queue_push(Err(ClientError::Timeout));
        let mut session = EditingSession::new(client.clone(), MockBackup::empty());
        session.load().await.unwrap();

        session.edit(|d| d.hero.name = "Unsaved".to_string());
        session.edit(|d| d.skills[0].skills.push("Rust".to_string()));
        let err = session.save().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.state(), SessionState::SaveFailed);
        // No data loss: the unsaved edits are still in the draft.
        assert_eq!(session.draft().hero.name, "Unsaved");
        assert!(session.draft().skills[0].skills.contains(&"Rust".to_string()));
        assert!(session.last_saved_at().is_none());

        // Retry resends the same draft wholesale.
        session.save().await.unwrap();
        assert_eq!(session.state(), SessionState::Synced);
        let pushed = client.pushed();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0], pushed[1]);
    }

    #[tokio::test]
    async fn test_save_unauthorized_is_not_retryable() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        client.queue_push(Err(ClientError::Unauthorized));
        let mut session = EditingSession::new(client, MockBackup::empty());
        session.load().await.unwrap();

        session.edit(|d| d.hero.name = "Edited".to_string());
        let err = session.save().await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(session.state(), SessionState::SaveFailed);
        assert_eq!(session.draft().hero.name, "Edited");
    }

    #[tokio::test]
    async fn test_update_section_replaces_only_that_section() {
        let client = MockClient::new();
        client.queue_fetch(Ok(server_doc()));
        let mut session = EditingSession::new(client, MockBackup::empty());
        session.load().await.unwrap();

        let mut contact = session.draft().contact.clone();
        contact.email = "new@example.com".to_string();
        session.update_section(SectionValue::Contact(contact));

        assert_eq!(session.state(), SessionState::Dirty);
        assert_eq!(session.draft().contact.email, "new@example.com");
        assert_eq!(session.draft().hero.name, "Server Copy");
    }
}
