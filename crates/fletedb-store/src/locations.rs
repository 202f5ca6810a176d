//! Operations on the `ubicaciones` table.

use serde::Deserialize;
use uuid::Uuid;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::types::NewLocation;
use crate::LOCATIONS_TABLE;

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Uuid,
}

impl StoreClient {
    /// Find a stored location whose address text equals `address` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request or decoding fails.
    pub async fn find_location_by_address(&self, address: &str) -> Result<Option<Uuid>, StoreError> {
        let rows: Vec<IdRow> = self
            .select(
                LOCATIONS_TABLE,
                &[
                    ("direccion", format!("eq.{address}")),
                    ("select", "id".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    /// Insert a new location and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails or no id comes back.
    pub async fn insert_location(&self, location: &NewLocation) -> Result<Uuid, StoreError> {
        let id = self.insert_returning_id(LOCATIONS_TABLE, location).await?;
        tracing::info!(address = %location.address, %id, "created location");
        Ok(id)
    }
}
