//! Seam between the dashboard and the hosted platform.
//!
//! Everything the dashboard persists goes through these traits: password
//! sign-in and token refresh, row reads and writes on the two tables, and
//! object uploads. `SupabaseBackend` talks to a real project over HTTP,
//! `MemoryBackend` keeps the same contract in process for tests and demos.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Filter;

pub mod error;
pub mod memory;
pub mod supabase;

pub use error::BackendError;
pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

/// Signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token pair handed out on sign-in or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control_secs: u64,
    pub upsert: bool,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Reachability of the hosted platform
    async fn health(&self) -> Result<(), BackendError>;
}

/// Row operations. Every call carries the user's access token so that the
/// platform's row-level security decides what the user may touch.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn select(&self, access_token: &str, filter: &Filter) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return the stored representation
    async fn insert(&self, access_token: &str, table: &str, row: Value) -> Result<Vec<Value>, BackendError>;

    /// Patch every row the filter matches. Refuses filters without conditions.
    async fn update(&self, access_token: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, BackendError>;

    /// Delete every row the filter matches. Refuses filters without conditions.
    async fn delete(&self, access_token: &str, filter: &Filter) -> Result<usize, BackendError>;
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<(), BackendError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

pub trait Backend: AuthBackend + TableBackend + StorageBackend {}

impl<T> Backend for T where T: AuthBackend + TableBackend + StorageBackend {}

/// Guard shared by both implementations: a write without conditions would
/// touch the whole table.
pub(crate) fn ensure_conditions(filter: &Filter) -> Result<(), BackendError> {
    if filter.wheres().is_empty() {
        return Err(BackendError::UnfilteredWrite(filter.table_name().to_string()));
    }
    Ok(())
}
