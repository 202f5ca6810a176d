//! Client for the hosted data store (Supabase's `PostgREST` interface).
//!
//! One [`StoreClient`] covers every table the ingestion tools touch:
//! `ubicaciones` (locations), `cargas` (listings), `messages` and `analysis`.
//! All requests go over HTTPS with the project API key; there is no pooling
//! and no retrying.

mod analyses;
mod client;
mod error;
mod listings;
mod locations;
mod messages;
mod stats;
mod types;

pub use client::StoreClient;
pub use error::StoreError;
pub use types::{AnalysisQuery, AnalysisRow, MessageQuery, MessageRow, NewLocation};

pub(crate) const LOCATIONS_TABLE: &str = "ubicaciones";
pub(crate) const LISTINGS_TABLE: &str = "cargas";
pub(crate) const MESSAGES_TABLE: &str = "messages";
pub(crate) const ANALYSIS_TABLE: &str = "analysis";

/// Page size used when an offset is requested without a limit.
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;
