// PostgreSQL-backed contact store
//
// One statement per operation; the update path may follow up with a read
// to tell a missing row from a blocked transition.

use crate::db::queries::{
    GET_MESSAGE_STATUS, INSERT_MESSAGE, LIST_RECENT_MESSAGES, UPDATE_MESSAGE_STATUS,
};
use crate::models::{ContactMessage, MessageStatus, NewContactMessage};
use crate::store::{ContactStore, StoreError, UpdateOutcome};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::debug;

pub struct PgContactStore {
    pool: Pool,
}

impl PgContactStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: &Row) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        created_at: row.get("created_at"),
        status: row.get("status"),
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, message: NewContactMessage) -> Result<String, StoreError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                INSERT_MESSAGE,
                &[
                    &message.name,
                    &message.email,
                    &message.phone,
                    &message.message,
                    &MessageStatus::New.as_str(),
                    &message.ip_address,
                    &message.user_agent,
                ],
            )
            .await?;

        Ok(row.get(0))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ContactMessage>, StoreError> {
        let client = self.pool.get().await?;

        let limit = i64::try_from(limit)
            .map_err(|_| StoreError::Other(format!("List limit {} is out of range", limit)))?;
        let rows = client.query(LIST_RECENT_MESSAGES, &[&limit]).await?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let client = self.pool.get().await?;

        let blocked: Vec<&str> = MessageStatus::blocked_sources(status)
            .iter()
            .map(MessageStatus::as_str)
            .collect();

        let affected = client
            .execute(UPDATE_MESSAGE_STATUS, &[&id, &status.as_str(), &blocked])
            .await?;
        if affected > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        let current = client.query_opt(GET_MESSAGE_STATUS, &[&id]).await?;
        debug!("Status update for {} matched no row (exists: {})", id, current.is_some());

        Ok(match current {
            Some(row) => UpdateOutcome::Rejected {
                current: row.get("status"),
            },
            None => UpdateOutcome::NotFound,
        })
    }
}
