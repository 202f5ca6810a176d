//! Batch ingestion of listing records from a JSON file.

pub(crate) mod locations;
pub(crate) mod pipeline;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use fletedb_core::{AppConfig, BatchReport, Catalogs};
use fletedb_geocode::GeocodingClient;
use fletedb_store::StoreClient;
use serde_json::Value;

use self::locations::LocationResolver;
use self::pipeline::IngestPipeline;

/// Clients shared by every ingestion entry point.
pub(crate) struct IngestContext {
    pub(crate) catalogs: Catalogs,
    pub(crate) store: StoreClient,
    pub(crate) geocoder: Option<GeocodingClient>,
}

impl IngestContext {
    /// Load catalogs and build the store and geocoding clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded or either client
    /// cannot be constructed.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let catalogs = match &config.catalogs_path {
            Some(path) => Catalogs::load(path)?,
            None => Catalogs::builtin()?,
        };

        let store = StoreClient::new(
            &config.supabase_url,
            &config.supabase_key,
            config.request_timeout_secs,
            &config.user_agent,
        )
        .context("failed to build store client")?;

        let geocoder = match config.google_maps_api_key.as_deref() {
            Some(key) => Some(
                GeocodingClient::new(key, config.request_timeout_secs, &config.user_agent)
                    .context("failed to build geocoding client")?,
            ),
            None => {
                tracing::warn!(
                    "GOOGLE_MAPS_API_KEY is not set; only already-stored locations can be resolved"
                );
                None
            }
        };

        Ok(Self {
            catalogs,
            store,
            geocoder,
        })
    }

    /// Run `records` through the listing pipeline.
    pub(crate) async fn ingest(&self, config: &AppConfig, records: Vec<Value>) -> BatchReport {
        let resolver = LocationResolver::new(
            &self.store,
            self.geocoder.as_ref(),
            &config.geocode_country,
            &config.geocode_language,
        );
        let pipeline = IngestPipeline::new(
            &self.catalogs,
            &self.store,
            resolver,
            config.default_owner_id,
            Duration::from_millis(config.inter_record_delay_ms),
        );
        pipeline.run(records).await
    }
}

/// Ingest the listings already read from `path` and print the report.
///
/// # Errors
///
/// Returns an error if the clients cannot be built. Per-record failures are
/// part of the report, not errors.
pub(crate) async fn run_ingest_file(
    config: &AppConfig,
    path: &Path,
    records: Vec<Value>,
) -> anyhow::Result<()> {
    tracing::info!(path = %path.display(), records = records.len(), "starting ingestion");

    let ctx = IngestContext::from_config(config)?;
    let report = ctx.ingest(config, records).await;

    log_summary(&report);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Read the input file as a non-empty JSON array.
///
/// # Errors
///
/// Returns an error on any read or parse failure, a non-array payload, or an
/// empty array.
pub(crate) fn load_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let Value::Array(records) = value else {
        anyhow::bail!("{} must contain a JSON array of listings", path.display());
    };
    if records.is_empty() {
        anyhow::bail!("{} contains an empty array; nothing to ingest", path.display());
    }
    Ok(records)
}

/// Log the human-readable run summary.
pub(crate) fn log_summary(report: &BatchReport) {
    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        success_rate = %format!("{:.1}%", report.success_rate),
        "ingestion finished"
    );
    for (index, errors) in report.failures() {
        tracing::warn!(index, errors = %errors, "record not stored");
    }
    if let Some(confidence) = &report.confidence {
        tracing::info!(
            average = %format!("{:.1}", confidence.average),
            records = confidence.records_with_confidence,
            "extraction confidence"
        );
    }
}
