//! Chat-bot intake: captured messages, their listing extractions, and the
//! analysis summary stored alongside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::RawListingRecord;

pub const ANALYSIS_CATEGORY: &str = "carga_transporte";
pub const ANALYSIS_LANGUAGE: &str = "es";

/// A message as captured by the chat bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: i64,
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
    pub timestamp: DateTime<Utc>,
}

/// Listing candidates extracted from one message by the upstream model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub message_id: i64,
    pub user_id: i64,
    pub original_text: String,
    #[serde(default)]
    pub cargas: Vec<Value>,
    pub extraction_success: bool,
    pub confidence: f64,
    #[serde(default)]
    pub errores: Vec<String>,
    pub model_used: String,
    /// Milliseconds spent by the extractor.
    pub processing_time: i64,
    pub timestamp: DateTime<Utc>,
}

/// Input document for one chat ingestion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatEnvelope {
    pub message: ChatMessage,
    pub extraction: ExtractionResult,
}

/// Row written to the `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMessage {
    pub telegram_message_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub text: String,
    pub chat_id: i64,
    pub chat_type: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for NewMessage {
    fn from(message: &ChatMessage) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        Self {
            telegram_message_id: message.message_id,
            user_id: message.user_id,
            username: non_empty(&message.username),
            first_name: non_empty(&message.first_name),
            last_name: non_empty(&message.last_name),
            text: message.text.clone(),
            chat_id: message.chat_id,
            chat_type: message.chat_type.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Row written to the `analysis` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnalysis {
    pub message_id: i64,
    pub telegram_message_id: i64,
    pub user_id: i64,
    pub original_text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub emotions: Vec<String>,
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
    pub summary: String,
    pub category: String,
    pub language: String,
    pub model_used: String,
    pub processing_time: i64,
    pub analysis_timestamp: DateTime<Utc>,
}

impl NewAnalysis {
    /// Summarize an extraction for storage, linked to the stored message row.
    #[must_use]
    pub fn from_extraction(extraction: &ExtractionResult, message_db_id: i64) -> Self {
        let candidates: Vec<RawListingRecord> = extraction
            .cargas
            .iter()
            .filter_map(|v| RawListingRecord::from_value(v).ok())
            .collect();

        let (sentiment, emotion) = if extraction.extraction_success {
            ("positive", "satisfacción")
        } else {
            ("negative", "confusión")
        };

        let topics = candidates
            .iter()
            .filter_map(|c| c.material.clone())
            .collect();

        let keywords = candidates
            .iter()
            .flat_map(|c| {
                [
                    c.material.clone(),
                    c.packaging().map(str::to_string),
                    c.tipo_equipo.clone(),
                    c.localidad_carga.clone(),
                    c.localidad_descarga.clone(),
                ]
            })
            .flatten()
            .collect();

        Self {
            message_id: message_db_id,
            telegram_message_id: extraction.message_id,
            user_id: extraction.user_id,
            original_text: extraction.original_text.clone(),
            sentiment: sentiment.to_string(),
            confidence: extraction.confidence,
            emotions: vec![emotion.to_string()],
            topics,
            keywords,
            summary: extraction_summary(&candidates),
            category: ANALYSIS_CATEGORY.to_string(),
            language: ANALYSIS_LANGUAGE.to_string(),
            model_used: extraction.model_used.clone(),
            processing_time: extraction.processing_time,
            analysis_timestamp: extraction.timestamp,
        }
    }
}

impl ExtractionResult {
    /// Candidates ready for the listing pipeline.
    ///
    /// Each object candidate inherits the extraction's confidence and upstream
    /// errors unless it already carries its own. Non-object candidates pass
    /// through untouched so the pipeline can report them.
    #[must_use]
    pub fn listing_candidates(&self) -> Vec<Value> {
        self.cargas
            .iter()
            .cloned()
            .map(|mut candidate| {
                if let Value::Object(map) = &mut candidate {
                    if map.get("confianza").is_none_or(Value::is_null) {
                        map.insert("confianza".to_string(), Value::from(self.confidence));
                    }
                    if map.get("errores").is_none_or(Value::is_null) && !self.errores.is_empty() {
                        map.insert("errores".to_string(), Value::from(self.errores.clone()));
                    }
                }
                candidate
            })
            .collect()
    }
}

/// Human summary of the extracted candidates, in the working language.
#[must_use]
pub fn extraction_summary(candidates: &[RawListingRecord]) -> String {
    if candidates.is_empty() {
        return "No se encontraron datos de carga válidos".to_string();
    }
    let routes: Vec<String> = candidates
        .iter()
        .map(|c| {
            format!(
                "{} de {} a {}",
                c.material.as_deref().unwrap_or("?"),
                c.localidad_carga.as_deref().unwrap_or("?"),
                c.localidad_descarga.as_deref().unwrap_or("?"),
            )
        })
        .collect();
    format!(
        "Se extrajeron {} carga(s): {}",
        candidates.len(),
        routes.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extraction(success: bool, cargas: Vec<Value>) -> ExtractionResult {
        ExtractionResult {
            message_id: 501,
            user_id: 77,
            original_text: "Soja Rosario a Córdoba 30tn".to_string(),
            cargas,
            extraction_success: success,
            confidence: 85.0,
            errores: Vec::new(),
            model_used: "extractor-v2".to_string(),
            processing_time: 1200,
            timestamp: "2024-08-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn successful_extraction_is_summarized() {
        let ex = extraction(
            true,
            vec![
                json!({
                    "material": "Soja",
                    "presentacion": "Granel",
                    "tipoEquipo": "Tolva",
                    "localidadCarga": "Rosario",
                    "localidadDescarga": "Córdoba"
                }),
                json!({ "material": "Trigo", "localidadCarga": "Junín", "localidadDescarga": "Rosario" }),
            ],
        );
        let analysis = NewAnalysis::from_extraction(&ex, 9);

        assert_eq!(analysis.message_id, 9);
        assert_eq!(analysis.telegram_message_id, 501);
        assert_eq!(analysis.sentiment, "positive");
        assert_eq!(analysis.emotions, vec!["satisfacción"]);
        assert_eq!(analysis.topics, vec!["Soja", "Trigo"]);
        assert_eq!(
            analysis.keywords,
            vec!["Soja", "Granel", "Tolva", "Rosario", "Córdoba", "Trigo", "Junín", "Rosario"]
        );
        assert_eq!(
            analysis.summary,
            "Se extrajeron 2 carga(s): Soja de Rosario a Córdoba, Trigo de Junín a Rosario"
        );
        assert_eq!(analysis.category, "carga_transporte");
        assert_eq!(analysis.language, "es");
    }

    #[test]
    fn failed_extraction_is_negative() {
        let analysis = NewAnalysis::from_extraction(&extraction(false, Vec::new()), 1);
        assert_eq!(analysis.sentiment, "negative");
        assert_eq!(analysis.emotions, vec!["confusión"]);
        assert_eq!(analysis.summary, "No se encontraron datos de carga válidos");
        assert!(analysis.topics.is_empty());
    }

    #[test]
    fn candidates_inherit_confidence_and_errors() {
        let mut ex = extraction(
            true,
            vec![
                json!({ "material": "Soja" }),
                json!({ "material": "Maiz", "confianza": 40, "errores": ["sin fecha"] }),
                json!("texto suelto"),
            ],
        );
        ex.errores = vec!["teléfono incompleto".to_string()];

        let candidates = ex.listing_candidates();
        assert_eq!(candidates[0]["confianza"], json!(85.0));
        assert_eq!(candidates[0]["errores"], json!(["teléfono incompleto"]));
        assert_eq!(candidates[1]["confianza"], json!(40));
        assert_eq!(candidates[1]["errores"], json!(["sin fecha"]));
        assert_eq!(candidates[2], json!("texto suelto"));
    }

    #[test]
    fn chat_message_maps_to_row_without_empty_names() {
        let message: ChatMessage = serde_json::from_value(json!({
            "messageId": 501,
            "userId": 77,
            "username": "",
            "firstName": "Ana",
            "text": "hola",
            "chatId": -100,
            "chatType": "group",
            "timestamp": "2024-08-01T12:00:00Z"
        }))
        .unwrap();

        let row = NewMessage::from(&message);
        assert_eq!(row.telegram_message_id, 501);
        assert!(row.username.is_none());
        assert_eq!(row.first_name.as_deref(), Some("Ana"));

        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("username").is_none());
        assert!(json.get("last_name").is_none());
        assert_eq!(json["chat_type"], "group");
    }
}
