//! Contact message storage
//!
//! The [`ContactStore`] trait is the seam between the HTTP handlers and the
//! persistence service. [`PgContactStore`](crate::db::PgContactStore) is the
//! production implementation; [`MemoryContactStore`] backs local runs and tests.

use crate::models::{ContactMessage, MessageStatus, NewContactMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum number of rows returned by the list endpoint
pub const LIST_LIMIT: usize = 100;

/// Failure of a single store operation. Always terminal for the request.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("{0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("{0}")]
    Other(String),
}

/// Result of a status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No row has the requested id
    NotFound,
    /// The row exists but its current status cannot move to the requested one
    Rejected { current: String },
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a submission with status `new`, returning the generated id
    async fn insert(&self, message: NewContactMessage) -> Result<String, StoreError>;

    /// Newest messages first, at most `limit` rows
    async fn list_recent(&self, limit: usize) -> Result<Vec<ContactMessage>, StoreError>;

    /// Set the status of one message, honouring the transition table
    async fn update_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<UpdateOutcome, StoreError>;
}

/// Full row as held by the in-memory store
#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
    status: String,
    ip_address: String,
    user_agent: String,
}

impl From<&StoredMessage> for ContactMessage {
    fn from(row: &StoredMessage) -> Self {
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            message: row.message.clone(),
            created_at: row.created_at,
            status: row.status.clone(),
        }
    }
}

/// Thread-safe in-memory store, rows kept in insertion order
#[derive(Clone, Default)]
pub struct MemoryContactStore {
    rows: Arc<RwLock<Vec<StoredMessage>>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Request metadata captured for a message
    #[cfg(test)]
    pub async fn client_info(&self, id: &str) -> Option<crate::models::ClientInfo> {
        self.rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .map(|row| crate::models::ClientInfo {
                ip_address: row.ip_address.clone(),
                user_agent: row.user_agent.clone(),
            })
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, message: NewContactMessage) -> Result<String, StoreError> {
        let mut rows = self.rows.write().await;
        // Keep created_at monotonic so "newest first" is stable even when
        // two inserts land on the same clock tick.
        let now = Utc::now();
        let created_at = match rows.last() {
            Some(last) if last.created_at >= now => last.created_at + chrono::Duration::microseconds(1),
            _ => now,
        };
        let id = Uuid::new_v4().to_string();
        rows.push(StoredMessage {
            id: id.clone(),
            name: message.name,
            email: message.email,
            phone: message.phone,
            message: message.message,
            created_at,
            status: MessageStatus::New.as_str().to_string(),
            ip_address: message.ip_address,
            user_agent: message.user_agent,
        });
        Ok(id)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ContactMessage>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().rev().take(limit).map(ContactMessage::from).collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        // Matched exactly, like the SQL `status = ANY(..)`; unknown legacy
        // values may move anywhere
        let blocked = MessageStatus::blocked_sources(status)
            .iter()
            .any(|from| from.as_str() == row.status);
        if blocked {
            return Ok(UpdateOutcome::Rejected {
                current: row.status.clone(),
            });
        }

        row.status = status.as_str().to_string();
        Ok(UpdateOutcome::Updated)
    }
}
