//! Read-only query handlers over stored messages and analyses.

use anyhow::Context;
use fletedb_core::AppConfig;
use fletedb_store::{AnalysisQuery, MessageQuery, StoreClient};

fn build_store(config: &AppConfig) -> anyhow::Result<StoreClient> {
    StoreClient::new(
        &config.supabase_url,
        &config.supabase_key,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build store client")
}

/// Print stored messages matching `query`, newest first.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_messages(config: &AppConfig, query: &MessageQuery) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let rows = store.list_messages(query).await?;
    tracing::info!(count = rows.len(), "fetched messages");
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Print stored analyses matching `query`, newest first.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_analyses(config: &AppConfig, query: &AnalysisQuery) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let rows = store.list_analyses(query).await?;
    tracing::info!(count = rows.len(), "fetched analyses");
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Print aggregate statistics for one user, or `null` when the user has no
/// stored messages.
///
/// # Errors
///
/// Returns an error if either store query fails.
pub(crate) async fn run_stats(config: &AppConfig, user_id: i64) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let stats = store.user_stats(user_id).await?;
    if stats.is_none() {
        tracing::warn!(user_id, "no messages stored for user");
    }
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Check that the store is reachable and the key is accepted.
///
/// # Errors
///
/// Returns an error if the store cannot be reached or rejects the request.
pub(crate) async fn run_ping(config: &AppConfig) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let count = store
        .ping()
        .await
        .with_context(|| format!("store at {} is not reachable", config.supabase_url))?;
    match count {
        Some(count) => println!("store reachable: {count} messages stored"),
        None => println!("store reachable"),
    }
    Ok(())
}
