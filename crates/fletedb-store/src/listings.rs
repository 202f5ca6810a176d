//! Operations on the `cargas` table.

use fletedb_core::NewListing;
use uuid::Uuid;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::LISTINGS_TABLE;

impl StoreClient {
    /// Insert one listing and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails or no id comes back.
    pub async fn insert_listing(&self, listing: &NewListing) -> Result<Uuid, StoreError> {
        self.insert_returning_id(LISTINGS_TABLE, listing).await
    }
}
