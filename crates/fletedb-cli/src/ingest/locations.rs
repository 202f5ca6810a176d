//! Address text to stored location id, geocoding only addresses never seen
//! before.

use fletedb_geocode::{GeocodeError, GeocodingClient};
use fletedb_store::{NewLocation, StoreClient, StoreError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub(crate) enum ResolveError {
    #[error("address text is empty")]
    EmptyAddress,

    #[error("'{address}' is not stored yet and geocoding is disabled (GOOGLE_MAPS_API_KEY is not set)")]
    GeocodingDisabled { address: String },

    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Resolves free-text addresses to location ids.
///
/// Lookups are exact on the address text: the first coordinates ever stored
/// for a text are reused forever. Calls are sequential; two concurrent
/// resolutions of the same unseen text would each create a row.
pub(crate) struct LocationResolver<'a> {
    store: &'a StoreClient,
    geocoder: Option<&'a GeocodingClient>,
    country: String,
    language: String,
}

impl<'a> LocationResolver<'a> {
    pub(crate) fn new(
        store: &'a StoreClient,
        geocoder: Option<&'a GeocodingClient>,
        country: &str,
        language: &str,
    ) -> Self {
        Self {
            store,
            geocoder,
            country: country.to_string(),
            language: language.to_string(),
        }
    }

    /// Return the stored location id for `address`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the address is blank, the lookup or
    /// insert fails, or the address is new and cannot be geocoded.
    pub(crate) async fn resolve(&self, address: &str) -> Result<Uuid, ResolveError> {
        if address.trim().is_empty() {
            return Err(ResolveError::EmptyAddress);
        }

        if let Some(id) = self.store.find_location_by_address(address).await? {
            tracing::debug!(address, %id, "reusing stored location");
            return Ok(id);
        }

        let geocoder = self.geocoder.ok_or_else(|| ResolveError::GeocodingDisabled {
            address: address.to_string(),
        })?;

        let geocoded = geocoder
            .geocode(address, &self.country, &self.language)
            .await?;
        tracing::info!(
            address,
            detected = %geocoded.formatted_address,
            lat = geocoded.latitude,
            lng = geocoded.longitude,
            "geocoded new address"
        );

        let id = self
            .store
            .insert_location(&NewLocation {
                address: address.to_string(),
                latitude: geocoded.latitude,
                longitude: geocoded.longitude,
            })
            .await?;
        Ok(id)
    }
}
