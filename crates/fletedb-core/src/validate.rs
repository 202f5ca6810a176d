//! Record validation against the reference catalogs and field normalizers.

use uuid::Uuid;

use crate::catalog::{CatalogKind, Catalogs};
use crate::normalize::{is_valid_email, is_valid_price, is_valid_weight, normalize_phone, parse_number};
use crate::record::RawListingRecord;

/// A listing whose required fields are present and whose categorical fields
/// each resolved to exactly one catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedListing {
    pub material_id: Uuid,
    pub presentation_id: Uuid,
    pub equipment_type_id: Uuid,
    /// Resolved payment method, or the catalog default when none was given.
    pub payment_method_id: Uuid,
    pub weight: String,
    pub origin: String,
    pub destination: String,
    pub load_date: String,
    pub unload_date: String,
    /// Phone in `+54…` form.
    pub phone: String,
    pub email: Option<String>,
    pub price: Option<String>,
    pub paid_by: Option<String>,
    pub reference_point: Option<String>,
    pub observations: Option<String>,
    pub confidence: Option<f64>,
}

/// Check one record and list every violation, in a fixed order.
///
/// An empty list means the record is valid. All checks run; none short-circuit.
#[must_use]
pub fn validate_record(record: &RawListingRecord, catalogs: &Catalogs) -> Vec<String> {
    validate(record, catalogs).err().unwrap_or_default()
}

/// Validate one record and, when it passes, resolve its catalog identifiers.
///
/// # Errors
///
/// Returns the full ordered list of violations when any check fails.
pub fn validate(
    record: &RawListingRecord,
    catalogs: &Catalogs,
) -> Result<ValidatedListing, Vec<String>> {
    let mut errors = Vec::new();

    let material = required_entry(
        &mut errors,
        catalogs,
        CatalogKind::Material,
        record.material.as_deref(),
        "material",
    );
    let presentation = required_entry(
        &mut errors,
        catalogs,
        CatalogKind::Presentation,
        record.packaging(),
        "packaging type",
    );

    if !is_valid_weight(record.peso.as_deref()) {
        errors.push("weight is required and must be a number greater than 0".to_string());
    }

    let equipment = required_entry(
        &mut errors,
        catalogs,
        CatalogKind::EquipmentType,
        record.tipo_equipo.as_deref(),
        "equipment type",
    );

    require_text(&mut errors, record.localidad_carga.as_deref(), "origin locality");
    require_text(&mut errors, record.localidad_descarga.as_deref(), "destination locality");
    require_text(&mut errors, record.fecha_carga.as_deref(), "load date");
    require_text(&mut errors, record.fecha_descarga.as_deref(), "unload date");

    let phone = match record.telefono.as_deref() {
        None => {
            errors.push("phone is required".to_string());
            None
        }
        Some(raw) => {
            let normalized = normalize_phone(raw);
            if normalized.is_none() {
                errors.push(format!("phone \"{raw}\" has no recognizable format"));
            }
            normalized
        }
    };

    if !is_valid_email(record.correo.as_deref()) {
        errors.push(format!(
            "email \"{}\" is not a valid address",
            record.correo.as_deref().unwrap_or_default()
        ));
    }

    if !is_valid_price(record.precio.as_deref()) {
        errors.push("price must be a number greater than or equal to 0".to_string());
    }

    let payment_method = match record.forma_de_pago.as_deref() {
        Some(name) => {
            let entry = catalogs.lookup(CatalogKind::PaymentMethod, name);
            if entry.is_none() {
                errors.push(format!("payment method \"{name}\" is not a valid option"));
            }
            entry
        }
        None => {
            let entry = catalogs.default_payment_method();
            if entry.is_none() {
                errors.push("payment method is required: the catalog has no default".to_string());
            }
            entry
        }
    };

    let confidence = match record.confianza.as_deref() {
        None => None,
        Some(raw) => {
            let value = parse_number(raw).filter(|c| (0.0..=100.0).contains(c));
            if value.is_none() {
                errors.push("confidence must be between 0 and 100".to_string());
            }
            value
        }
    };

    match (material, presentation, equipment, payment_method, phone) {
        (Some(material), Some(presentation), Some(equipment), Some(payment), Some(phone))
            if errors.is_empty() =>
        {
            Ok(ValidatedListing {
                material_id: material.id,
                presentation_id: presentation.id,
                equipment_type_id: equipment.id,
                payment_method_id: payment.id,
                weight: record.peso.clone().unwrap_or_default(),
                origin: record.localidad_carga.clone().unwrap_or_default(),
                destination: record.localidad_descarga.clone().unwrap_or_default(),
                load_date: record.fecha_carga.clone().unwrap_or_default(),
                unload_date: record.fecha_descarga.clone().unwrap_or_default(),
                phone,
                email: record.correo.clone(),
                price: record.precio.clone(),
                paid_by: record.pago_por.clone(),
                reference_point: record.punto_referencia.clone(),
                observations: record.observaciones.clone(),
                confidence,
            })
        }
        _ => Err(errors),
    }
}

fn required_entry<'a>(
    errors: &mut Vec<String>,
    catalogs: &'a Catalogs,
    kind: CatalogKind,
    value: Option<&str>,
    label: &str,
) -> Option<&'a crate::catalog::CatalogEntry> {
    let Some(name) = value else {
        errors.push(format!("{label} is required"));
        return None;
    };
    let entry = catalogs.lookup(kind, name);
    if entry.is_none() {
        errors.push(format!("{label} \"{name}\" is not a valid option"));
    }
    entry
}

fn require_text(errors: &mut Vec<String>, value: Option<&str>, label: &str) {
    if value.is_none() {
        errors.push(format!("{label} is required"));
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
