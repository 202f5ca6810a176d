//! Row and query types for the store tables.

use chrono::{DateTime, SecondsFormat, Utc};
use fletedb_core::{AnalysisSummary, MessageSummary};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_SIZE;

/// Input record for the `ubicaciones` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLocation {
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

/// A row from the `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub telegram_message_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub text: String,
    pub chat_id: i64,
    pub chat_type: String,
    pub timestamp: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<&MessageRow> for MessageSummary {
    fn from(row: &MessageRow) -> Self {
        Self {
            username: row.username.clone(),
            timestamp: row.timestamp.clone(),
        }
    }
}

/// A row from the `analysis` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub id: i64,
    pub message_id: i64,
    pub telegram_message_id: i64,
    pub user_id: i64,
    pub original_text: String,
    pub sentiment: String,
    pub confidence: f64,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub summary: String,
    pub category: String,
    pub language: String,
    pub model_used: String,
    pub processing_time: i64,
    pub analysis_timestamp: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<&AnalysisRow> for AnalysisSummary {
    fn from(row: &AnalysisRow) -> Self {
        Self {
            sentiment: row.sentiment.clone(),
            category: row.category.clone(),
            emotions: row.emotions.clone(),
            confidence: row.confidence,
        }
    }
}

/// Filters for listing messages. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub user_id: Option<i64>,
    pub chat_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl MessageQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(user_id) = self.user_id {
            params.push(("user_id", format!("eq.{user_id}")));
        }
        if let Some(chat_id) = self.chat_id {
            params.push(("chat_id", format!("eq.{chat_id}")));
        }
        push_range(&mut params, "timestamp", self.from, self.to);
        params.push(("order", "timestamp.desc".to_string()));
        push_page(&mut params, self.limit, self.offset);
        params
    }
}

/// Filters for listing analyses. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct AnalysisQuery {
    pub user_id: Option<i64>,
    pub sentiment: Option<String>,
    pub category: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AnalysisQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(user_id) = self.user_id {
            params.push(("user_id", format!("eq.{user_id}")));
        }
        if let Some(sentiment) = &self.sentiment {
            params.push(("sentiment", format!("eq.{sentiment}")));
        }
        if let Some(category) = &self.category {
            params.push(("category", format!("eq.{category}")));
        }
        push_range(&mut params, "analysis_timestamp", self.from, self.to);
        params.push(("order", "analysis_timestamp.desc".to_string()));
        push_page(&mut params, self.limit, self.offset);
        params
    }
}

fn push_range(
    params: &mut Vec<(&'static str, String)>,
    column: &'static str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) {
    if let Some(from) = from {
        params.push((column, format!("gte.{}", from.to_rfc3339_opts(SecondsFormat::Millis, true))));
    }
    if let Some(to) = to {
        params.push((column, format!("lte.{}", to.to_rfc3339_opts(SecondsFormat::Millis, true))));
    }
}

/// An offset without a limit reads one default-sized page.
fn push_page(params: &mut Vec<(&'static str, String)>, limit: Option<u32>, offset: Option<u32>) {
    match (limit, offset) {
        (limit, Some(offset)) if offset > 0 => {
            params.push(("offset", offset.to_string()));
            params.push(("limit", limit.unwrap_or(DEFAULT_PAGE_SIZE).to_string()));
        }
        (Some(limit), _) => params.push(("limit", limit.to_string())),
        (None, _) => {}
    }
}
