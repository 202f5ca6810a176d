//! Mapping from a validated listing to the `cargas` storage row.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::normalize::normalize_date_on;
use crate::validate::ValidatedListing;

/// Owner assigned to every listing created by the automatic loader.
pub const DEFAULT_OWNER_ID: &str = "20d060b6-33b5-4222-a039-a3e603d979be";

/// Free-text columns are non-null in the store; absent values become one space.
const BLANK: &str = " ";
const DEFAULT_PAID_BY: &str = "Otros";
const DEFAULT_PRICE: &str = "0";

/// Row written to the `cargas` table. Field names are the column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewListing {
    pub dador_id: Uuid,
    pub peso: String,
    pub ubicacioninicial_id: Uuid,
    pub ubicacionfinal_id: Uuid,
    pub telefonodador: String,
    pub puntoreferencia: String,
    pub material_id: Uuid,
    pub presentacion_id: Uuid,
    pub valorviaje: String,
    pub pagopor: String,
    pub otropagopor: Option<String>,
    pub fechacarga: String,
    pub fechadescarga: String,
    pub formadepago_id: Uuid,
    pub email: String,
    pub tipo_equipo: Uuid,
    pub observaciones: String,
}

impl NewListing {
    /// Build the storage row, normalizing dates against `today` and filling
    /// defaults for absent optional fields.
    #[must_use]
    pub fn from_validated(
        listing: &ValidatedListing,
        origin_id: Uuid,
        destination_id: Uuid,
        owner_id: Uuid,
        today: NaiveDate,
    ) -> Self {
        let or_blank = |v: &Option<String>| v.clone().unwrap_or_else(|| BLANK.to_string());

        Self {
            dador_id: owner_id,
            peso: listing.weight.clone(),
            ubicacioninicial_id: origin_id,
            ubicacionfinal_id: destination_id,
            telefonodador: listing.phone.clone(),
            puntoreferencia: or_blank(&listing.reference_point),
            material_id: listing.material_id,
            presentacion_id: listing.presentation_id,
            valorviaje: listing
                .price
                .clone()
                .unwrap_or_else(|| DEFAULT_PRICE.to_string()),
            pagopor: listing
                .paid_by
                .clone()
                .unwrap_or_else(|| DEFAULT_PAID_BY.to_string()),
            otropagopor: None,
            fechacarga: normalize_date_on(Some(&listing.load_date), today),
            fechadescarga: normalize_date_on(Some(&listing.unload_date), today),
            formadepago_id: listing.payment_method_id,
            email: or_blank(&listing.email),
            tipo_equipo: listing.equipment_type_id,
            observaciones: or_blank(&listing.observations),
        }
    }
}
