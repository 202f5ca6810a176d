//! Ingestion of one chat message together with its listing extraction.

use std::path::Path;

use anyhow::Context;
use fletedb_core::{AppConfig, BatchReport, ChatEnvelope, NewAnalysis, NewMessage};
use serde::Serialize;

use crate::ingest::{log_summary, IngestContext};

#[derive(Debug, Serialize)]
pub(crate) struct ChatIngestOutput {
    pub(crate) message_id: i64,
    pub(crate) analysis_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) listings: Option<BatchReport>,
}

/// Read a chat envelope from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a
/// `{ "message": ..., "extraction": ... }` object.
pub(crate) fn load_envelope(path: &Path) -> anyhow::Result<ChatEnvelope> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid chat extraction envelope", path.display()))
}

/// Store the message and its analysis, then ingest the extracted listings.
///
/// # Errors
///
/// Returns an error if the envelope cannot be loaded or the message or
/// analysis cannot be stored. Listing failures are part of the report.
pub(crate) async fn run_chat_ingest(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let envelope = load_envelope(path)?;
    let ctx = IngestContext::from_config(config)?;
    let output = ingest_chat(&ctx, config, &envelope).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Message first, then its analysis keyed by the stored message id, then the
/// listing candidates. A storage failure on either row stops before the
/// listings.
///
/// # Errors
///
/// Returns an error if the message or analysis insert fails.
pub(crate) async fn ingest_chat(
    ctx: &IngestContext,
    config: &AppConfig,
    envelope: &ChatEnvelope,
) -> anyhow::Result<ChatIngestOutput> {
    if envelope.message.message_id != envelope.extraction.message_id {
        tracing::warn!(
            message_id = envelope.message.message_id,
            extraction_message_id = envelope.extraction.message_id,
            "extraction refers to a different message id"
        );
    }

    let message_id = ctx
        .store
        .insert_message(&NewMessage::from(&envelope.message))
        .await
        .context("failed to store chat message")?;

    let analysis = NewAnalysis::from_extraction(&envelope.extraction, message_id);
    let analysis_id = ctx
        .store
        .insert_analysis(&analysis)
        .await
        .context("failed to store message analysis")?;
    tracing::info!(
        message_id,
        analysis_id,
        sentiment = %analysis.sentiment,
        summary = %analysis.summary,
        "stored chat message analysis"
    );

    let candidates = envelope.extraction.listing_candidates();
    let listings = if candidates.is_empty() {
        tracing::info!(message_id, "no listing candidates in extraction");
        None
    } else {
        let report = ctx.ingest(config, candidates).await;
        log_summary(&report);
        Some(report)
    };

    Ok(ChatIngestOutput {
        message_id,
        analysis_id,
        listings,
    })
}
