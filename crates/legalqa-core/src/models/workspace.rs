//! Response types for the authenticated workspace and the public ask endpoint.
//!
//! These are consumed by the view layer only; the session core never
//! inspects them.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// `POST /ask` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Acknowledgement returned by the ingestion endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Which aggregated usage series to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsWindow {
    Daily,
    Weekly,
}

impl MetricsWindow {
    pub fn path(&self) -> &'static str {
        match self {
            MetricsWindow::Daily => "/monitoring/daily_metrics",
            MetricsWindow::Weekly => "/monitoring/weekly_metrics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MetricsWindow::Daily => "Daily",
            MetricsWindow::Weekly => "Weekly",
        }
    }
}

/// One bucket of question-answering usage. Missing or null numbers read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricPoint {
    #[serde(deserialize_with = "zero_if_null")]
    pub count: u64,
    #[serde(deserialize_with = "zero_if_null")]
    pub avg_response_time: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub median_response_time: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub p95_response_time: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub answer_length: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub question_length: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub input_tokens: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub retrieval_k: f64,
}

fn zero_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Metric series keyed by bucket label (a date or ISO week), sorted.
pub type MetricSeries = BTreeMap<String, MetricPoint>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerComparison {
    #[serde(default)]
    pub identical: bool,
    #[serde(default)]
    pub diff: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievedDocuments {
    #[serde(default)]
    pub production: Vec<String>,
    #[serde(default)]
    pub shadow: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftMetrics {
    pub response_time: Option<f64>,
    #[serde(default)]
    pub drift: bool,
    #[serde(default)]
    pub token_drift: bool,
}

/// A production/shadow answer pair recorded by the drift explorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftRecord {
    pub question_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub production_answer: String,
    #[serde(default)]
    pub shadow_answer: String,
    #[serde(default)]
    pub answer_comparison: AnswerComparison,
    #[serde(default)]
    pub retrieved_documents: RetrievedDocuments,
    #[serde(default)]
    pub metrics: DriftMetrics,
    /// Unix seconds
    pub timestamp: Option<f64>,
    pub production_model: Option<bool>,
    pub shadow_model: Option<bool>,
}

impl DriftRecord {
    /// Format the record timestamp as `YYYY-MM-DD HH:MM:SS` (UTC), or "N/A".
    pub fn timestamp_display(&self) -> String {
        self.timestamp
            .and_then(|ts| DateTime::from_timestamp(ts.trunc() as i64, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_series_defaults_missing_fields() {
        let json = r#"{
            "2024-05-02": {"count": 3, "avg_response_time": 1.5},
            "2024-05-01": {"count": 1, "p95_response_time": null}
        }"#;
        let series: MetricSeries = serde_json::from_str(json).expect("Failed to parse metrics");
        let labels: Vec<&String> = series.keys().collect();
        assert_eq!(labels, vec!["2024-05-01", "2024-05-02"]);
        assert_eq!(series["2024-05-02"].avg_response_time, 1.5);
        assert_eq!(series["2024-05-01"].median_response_time, 0.0);
        assert_eq!(series["2024-05-01"].p95_response_time, 0.0);
    }

    #[test]
    fn test_drift_record_parse_and_timestamp() {
        let json = r#"{
            "question_id": "q-17",
            "question": "What is consideration?",
            "production_answer": "A",
            "shadow_answer": "B",
            "answer_comparison": {"identical": false, "diff": "- A\n+ B"},
            "retrieved_documents": {"production": ["doc1"], "shadow": []},
            "metrics": {"response_time": 0.8, "drift": true},
            "timestamp": 1700000000
        }"#;
        let record: DriftRecord = serde_json::from_str(json).expect("Failed to parse drift JSON");
        assert_eq!(record.question_id, "q-17");
        assert!(record.metrics.drift);
        assert!(!record.metrics.token_drift);
        assert_eq!(record.retrieved_documents.production, vec!["doc1"]);
        assert_eq!(record.timestamp_display(), "2023-11-14 22:13:20");
        assert_eq!(record.production_model, None);
    }

    #[test]
    fn test_drift_record_without_timestamp() {
        let record: DriftRecord =
            serde_json::from_str(r#"{"question_id": "q-1"}"#).expect("Failed to parse drift JSON");
        assert_eq!(record.timestamp_display(), "N/A");
        assert!(!record.answer_comparison.identical);
    }

    #[test]
    fn test_metrics_window_paths() {
        assert_eq!(MetricsWindow::Daily.path(), "/monitoring/daily_metrics");
        assert_eq!(MetricsWindow::Weekly.path(), "/monitoring/weekly_metrics");
    }
}
