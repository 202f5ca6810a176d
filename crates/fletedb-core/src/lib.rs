//! Domain types and pure logic for freight-listing ingestion: reference
//! catalogs, field normalizers, record validation, storage mapping, batch
//! reporting, and the chat-analysis summaries.

pub mod app_config;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod listing;
pub mod normalize;
pub mod record;
pub mod report;
pub mod stats;
pub mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogEntry, CatalogKind, Catalogs};
pub use chat::{ChatEnvelope, ChatMessage, ExtractionResult, NewAnalysis, NewMessage};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{NewListing, DEFAULT_OWNER_ID};
pub use record::{RawListingRecord, RecordError};
pub use report::{BatchReport, ConfidenceStats, RecordOutcome, RecordResult};
pub use stats::{compute_user_stats, AnalysisSummary, MessageSummary, RankedCount, UserStats};
pub use validate::{validate, validate_record, ValidatedListing};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalogs file {path}: {source}")]
    CatalogsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogs: {0}")]
    CatalogsFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
