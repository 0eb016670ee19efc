//! Shared application state handed to handlers through axum's `State`
//! extractor. Stores and the notifier are explicit handles; nothing in the
//! request path touches process-global mutable state.

use std::sync::Arc;

use crate::notify::Notifier;
use crate::store::{ContactStore, ContentStore};

/// Credential material for the single admin account.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password_hash: String,
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub notifier: Arc<dyn Notifier>,
    pub auth: Arc<AuthConfig>,
}

#[cfg(test)]
impl AppState {
    /// Fresh state over in-memory stores for handler tests.
    pub fn for_tests() -> Self {
        use crate::notify::NoopNotifier;
        use crate::store::memory::{MemoryContactStore, MemoryContentStore};

        Self {
            content: Arc::new(MemoryContentStore::new()),
            contacts: Arc::new(MemoryContactStore::new()),
            notifier: Arc::new(NoopNotifier),
            auth: Arc::new(AuthConfig {
                admin_username: "admin".to_string(),
                // Low cost keeps the test suite fast.
                admin_password_hash: bcrypt::hash("admin123", 4).unwrap(),
                jwt_secret: "test-jwt-secret".to_string(),
            }),
        }
    }
}
