//! Sequential per-record ingestion: validate, resolve both locations, insert.
//!
//! Failures are recorded per record and never abort the batch.

use std::time::Duration;

use chrono::Utc;
use fletedb_core::{
    validate, BatchReport, Catalogs, NewListing, RawListingRecord, RecordOutcome, RecordResult,
};
use fletedb_store::StoreClient;
use serde_json::Value;
use uuid::Uuid;

use super::locations::LocationResolver;

pub(crate) struct IngestPipeline<'a> {
    catalogs: &'a Catalogs,
    store: &'a StoreClient,
    resolver: LocationResolver<'a>,
    owner_id: Uuid,
    delay: Duration,
}

impl<'a> IngestPipeline<'a> {
    pub(crate) fn new(
        catalogs: &'a Catalogs,
        store: &'a StoreClient,
        resolver: LocationResolver<'a>,
        owner_id: Uuid,
        delay: Duration,
    ) -> Self {
        Self {
            catalogs,
            store,
            resolver,
            owner_id,
            delay,
        }
    }

    /// Process every record in order and aggregate the outcomes.
    pub(crate) async fn run(&self, records: Vec<Value>) -> BatchReport {
        let total = records.len();
        let mut results = Vec::with_capacity(total);

        for (position, value) in records.into_iter().enumerate() {
            let index = position + 1;
            tracing::info!(index, total, "processing record");

            results.push(self.process(index, value).await);

            if index < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        BatchReport::from_results(results)
    }

    async fn process(&self, index: usize, value: Value) -> RecordResult {
        let raw = match RawListingRecord::from_value(&value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping record");
                return RecordResult {
                    index,
                    record: value,
                    confidence: None,
                    outcome: RecordOutcome::Failed {
                        errors: vec![e.to_string()],
                    },
                };
            }
        };

        tracing::info!(
            index,
            material = raw.material.as_deref().unwrap_or("-"),
            origin = raw.localidad_carga.as_deref().unwrap_or("-"),
            destination = raw.localidad_descarga.as_deref().unwrap_or("-"),
            "listing route"
        );

        let confidence = raw.confidence();
        if let Some(confidence) = confidence {
            tracing::info!(index, confidence, "extraction confidence");
        }
        if !raw.errores.is_empty() {
            tracing::warn!(
                index,
                upstream_errors = %raw.errores.join("; "),
                "record carries upstream extraction errors"
            );
        }

        let outcome = self.create_listing(index, &raw).await;
        RecordResult {
            index,
            record: serde_json::to_value(&raw).unwrap_or(value),
            confidence,
            outcome,
        }
    }

    async fn create_listing(&self, index: usize, raw: &RawListingRecord) -> RecordOutcome {
        let validated = match validate(raw, self.catalogs) {
            Ok(v) => v,
            Err(errors) => {
                tracing::warn!(index, errors = %errors.join("; "), "record failed validation");
                return RecordOutcome::Failed { errors };
            }
        };

        let origin_id = match self.resolver.resolve(&validated.origin).await {
            Ok(id) => id,
            Err(e) => return failed(index, format!("origin location \"{}\": {e}", validated.origin)),
        };
        let destination_id = match self.resolver.resolve(&validated.destination).await {
            Ok(id) => id,
            Err(e) => {
                return failed(
                    index,
                    format!("destination location \"{}\": {e}", validated.destination),
                )
            }
        };

        let listing = NewListing::from_validated(
            &validated,
            origin_id,
            destination_id,
            self.owner_id,
            Utc::now().date_naive(),
        );

        match self.store.insert_listing(&listing).await {
            Ok(listing_id) => {
                tracing::info!(index, %listing_id, "listing created");
                RecordOutcome::Created { listing_id }
            }
            Err(e) => failed(index, format!("failed to insert listing: {e}")),
        }
    }
}

fn failed(index: usize, message: String) -> RecordOutcome {
    tracing::warn!(index, error = %message, "record failed");
    RecordOutcome::Failed {
        errors: vec![message],
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
