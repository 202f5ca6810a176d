//! Per-user statistics assembled from the `messages` and `analysis` tables.

use fletedb_core::{compute_user_stats, AnalysisSummary, MessageSummary, UserStats};

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::types::{AnalysisQuery, MessageQuery};

impl StoreClient {
    /// Aggregate statistics for one user's messages and analyses.
    ///
    /// Returns `None` when the user has no stored messages.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either listing request fails.
    pub async fn user_stats(&self, user_id: i64) -> Result<Option<UserStats>, StoreError> {
        let messages = self
            .list_messages(&MessageQuery {
                user_id: Some(user_id),
                ..MessageQuery::default()
            })
            .await?;
        let analyses = self
            .list_analyses(&AnalysisQuery {
                user_id: Some(user_id),
                ..AnalysisQuery::default()
            })
            .await?;

        let messages: Vec<MessageSummary> = messages.iter().map(MessageSummary::from).collect();
        let analyses: Vec<AnalysisSummary> = analyses.iter().map(AnalysisSummary::from).collect();
        Ok(compute_user_stats(user_id, &messages, &analyses))
    }
}
