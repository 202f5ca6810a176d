//! Operations on the `analysis` table.

use fletedb_core::NewAnalysis;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::types::{AnalysisQuery, AnalysisRow};
use crate::ANALYSIS_TABLE;

impl StoreClient {
    /// Store one analysis summary and return its row id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails or no id comes back.
    pub async fn insert_analysis(&self, analysis: &NewAnalysis) -> Result<i64, StoreError> {
        let id = self.insert_returning_id(ANALYSIS_TABLE, analysis).await?;
        tracing::info!(id, message_id = analysis.message_id, "saved analysis");
        Ok(id)
    }

    /// List analyses matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request or decoding fails.
    pub async fn list_analyses(&self, query: &AnalysisQuery) -> Result<Vec<AnalysisRow>, StoreError> {
        self.select(ANALYSIS_TABLE, &query.to_params()).await
    }
}
