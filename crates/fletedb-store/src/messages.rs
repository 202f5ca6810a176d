//! Operations on the `messages` table.

use fletedb_core::NewMessage;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::types::{MessageQuery, MessageRow};
use crate::MESSAGES_TABLE;

impl StoreClient {
    /// Store one chat message and return its row id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails or no id comes back.
    pub async fn insert_message(&self, message: &NewMessage) -> Result<i64, StoreError> {
        let id = self.insert_returning_id(MESSAGES_TABLE, message).await?;
        tracing::info!(id, telegram_message_id = message.telegram_message_id, "saved message");
        Ok(id)
    }

    /// List messages matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request or decoding fails.
    pub async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<MessageRow>, StoreError> {
        self.select(MESSAGES_TABLE, &query.to_params()).await
    }
}
