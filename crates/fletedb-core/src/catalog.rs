//! Reference catalogs: the fixed name → identifier tables for materials,
//! packaging presentations, payment methods, and equipment types.
//!
//! The production tables are compiled in from `config/catalogs.yaml`. An
//! operator may replace them with [`Catalogs::load`]; either way they are
//! loaded once at startup and never mutated.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ConfigError;

const BUILTIN_CATALOGS: &str = include_str!("../config/catalogs.yaml");

/// Payment method applied when a listing does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Efectivo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Material,
    Presentation,
    PaymentMethod,
    EquipmentType,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Material => write!(f, "material"),
            CatalogKind::Presentation => write!(f, "presentation"),
            CatalogKind::PaymentMethod => write!(f, "payment method"),
            CatalogKind::EquipmentType => write!(f, "equipment type"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalogs {
    pub materials: Vec<CatalogEntry>,
    pub presentations: Vec<CatalogEntry>,
    pub payment_methods: Vec<CatalogEntry>,
    pub equipment_types: Vec<CatalogEntry>,
}

impl Catalogs {
    /// The catalogs compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only if the embedded YAML is malformed, which
    /// the unit tests rule out.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CATALOGS)
    }

    /// Load and validate catalogs from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate catalogs from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document cannot be parsed or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let catalogs: Catalogs = serde_yaml::from_str(content)?;
        catalogs.validate()?;
        Ok(catalogs)
    }

    #[must_use]
    pub fn entries(&self, kind: CatalogKind) -> &[CatalogEntry] {
        match kind {
            CatalogKind::Material => &self.materials,
            CatalogKind::Presentation => &self.presentations,
            CatalogKind::PaymentMethod => &self.payment_methods,
            CatalogKind::EquipmentType => &self.equipment_types,
        }
    }

    /// Find the entry whose name equals `name`, ignoring letter case.
    ///
    /// Matching is exact otherwise: no trimming, substrings, or fuzziness.
    #[must_use]
    pub fn lookup(&self, kind: CatalogKind, name: &str) -> Option<&CatalogEntry> {
        lookup_by_name(self.entries(kind), name)
    }

    #[must_use]
    pub fn default_payment_method(&self) -> Option<&CatalogEntry> {
        self.lookup(CatalogKind::PaymentMethod, DEFAULT_PAYMENT_METHOD)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in [
            CatalogKind::Material,
            CatalogKind::Presentation,
            CatalogKind::PaymentMethod,
            CatalogKind::EquipmentType,
        ] {
            let mut seen_names = HashSet::new();
            let mut seen_ids = HashSet::new();

            for entry in self.entries(kind) {
                if entry.name.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{kind} catalog has an entry with an empty name"
                    )));
                }
                if !seen_names.insert(entry.name.to_lowercase()) {
                    return Err(ConfigError::Validation(format!(
                        "duplicate {kind} name: '{}'",
                        entry.name
                    )));
                }
                if !seen_ids.insert(entry.id) {
                    return Err(ConfigError::Validation(format!(
                        "duplicate {kind} id: {}",
                        entry.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Case-insensitive exact name lookup over one catalog.
#[must_use]
pub fn lookup_by_name<'a>(entries: &'a [CatalogEntry], name: &str) -> Option<&'a CatalogEntry> {
    let wanted = name.to_lowercase();
    entries.iter().find(|e| e.name.to_lowercase() == wanted)
}
