//! Typed intake for one raw listing record.
//!
//! Upstream producers (a JSON file or a chat extraction) send loosely typed
//! objects: numbers where strings are expected, `null` for unknown values,
//! empty strings for blanks. [`RawListingRecord::from_value`] is the single
//! place where that looseness is folded into `Option<String>` fields.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("listing record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// One listing as received, with absent values stripped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListingRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_carga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_equipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localidad_carga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localidad_descarga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_carga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_descarga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forma_de_pago: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pago_por: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punto_referencia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    /// Kept as text; range-checked by the validator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confianza: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errores: Vec<String>,
}

impl RawListingRecord {
    /// Fold a JSON value into a record, dropping every absent field.
    ///
    /// `null`, empty strings, and whitespace-only strings are treated as
    /// absent. Numbers and booleans in text fields are rendered as text.
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let Value::Object(map) = value else {
            return Err(RecordError::NotAnObject(json_kind(value)));
        };

        let text = |key: &str| field_text(map, key);

        Ok(Self {
            material: text("material"),
            tipo_carga: text("tipoCarga"),
            presentacion: text("presentacion"),
            peso: text("peso"),
            tipo_equipo: text("tipoEquipo"),
            localidad_carga: text("localidadCarga"),
            localidad_descarga: text("localidadDescarga"),
            fecha_carga: text("fechaCarga"),
            fecha_descarga: text("fechaDescarga"),
            telefono: text("telefono"),
            correo: text("correo"),
            precio: text("precio"),
            forma_de_pago: text("formaDePago"),
            pago_por: text("pagoPor"),
            punto_referencia: text("puntoReferencia"),
            observaciones: text("observaciones"),
            confianza: text("confianza"),
            errores: field_list(map, "errores"),
        })
    }

    /// Packaging type, accepting either `tipoCarga` or its `presentacion` alias.
    #[must_use]
    pub fn packaging(&self) -> Option<&str> {
        self.tipo_carga.as_deref().or(self.presentacion.as_deref())
    }

    /// Confidence score when present and numeric.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.confianza
            .as_deref()
            .and_then(crate::normalize::parse_number)
    }
}

fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(render_number(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn field_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::String(_) | Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Integers print as-is; floats with no fractional part drop the `.0`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
