//! Batch outcome aggregation.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Created { listing_id: Uuid },
    Failed { errors: Vec<String> },
}

impl RecordOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RecordOutcome::Created { .. })
    }
}

/// One processed record. `index` is 1-based, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResult {
    pub index: usize,
    /// The cleaned record, or the raw element when it was not an object.
    pub record: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceStats {
    pub average: f64,
    pub records_with_confidence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    /// Percentage of records that succeeded, rounded to one decimal.
    pub success_rate: f64,
    pub confidence: Option<ConfidenceStats>,
    pub results: Vec<RecordResult>,
}

impl BatchReport {
    /// Aggregate per-record results into counts and confidence statistics.
    #[must_use]
    pub fn from_results(results: Vec<RecordResult>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        let failed = total - succeeded;

        let confidences: Vec<f64> = results.iter().filter_map(|r| r.confidence).collect();
        let confidence = if confidences.is_empty() {
            None
        } else {
            Some(ConfidenceStats {
                average: round_one(confidences.iter().sum::<f64>() / as_f64(confidences.len())),
                records_with_confidence: confidences.len(),
            })
        };

        let success_rate = if total == 0 {
            0.0
        } else {
            round_one(as_f64(succeeded) * 100.0 / as_f64(total))
        };

        Self {
            succeeded,
            failed,
            total,
            success_rate,
            confidence,
            results,
        }
    }

    /// Failed records with their joined error text, for the run summary.
    pub fn failures(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        self.results.iter().filter_map(|r| match &r.outcome {
            RecordOutcome::Failed { errors } => Some((r.index, errors.join(", "))),
            RecordOutcome::Created { .. } => None,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(n: usize) -> f64 {
    n as f64
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn created(index: usize, confidence: Option<f64>) -> RecordResult {
        RecordResult {
            index,
            record: json!({}),
            confidence,
            outcome: RecordOutcome::Created {
                listing_id: Uuid::new_v4(),
            },
        }
    }

    fn failed(index: usize, errors: &[&str]) -> RecordResult {
        RecordResult {
            index,
            record: json!({}),
            confidence: None,
            outcome: RecordOutcome::Failed {
                errors: errors.iter().map(ToString::to_string).collect(),
            },
        }
    }

    #[test]
    fn counts_successes_and_failures() {
        let report = BatchReport::from_results(vec![
            created(1, None),
            failed(2, &["material is required"]),
            created(3, None),
        ]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total, 3);
        assert!((report.success_rate - 66.7).abs() < f64::EPSILON);
        assert!(report.confidence.is_none());
    }

    #[test]
    fn averages_confidence_over_records_that_carry_it() {
        let report = BatchReport::from_results(vec![
            created(1, Some(90.0)),
            created(2, None),
            created(3, Some(75.0)),
        ]);
        let stats = report.confidence.unwrap();
        assert_eq!(stats.records_with_confidence, 2);
        assert!((stats.average - 82.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_batch_has_zero_rate() {
        let report = BatchReport::from_results(Vec::new());
        assert_eq!(report.total, 0);
        assert!(report.success_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn failures_join_error_lists() {
        let report = BatchReport::from_results(vec![
            created(1, None),
            failed(2, &["material is required", "phone is required"]),
        ]);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(
            failures,
            vec![(2, "material is required, phone is required".to_string())]
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(failed(4, &["x"])).unwrap();
        assert_eq!(value["index"], 4);
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["outcome"]["errors"], json!(["x"]));
        assert!(value.get("confidence").is_none());
    }
}
