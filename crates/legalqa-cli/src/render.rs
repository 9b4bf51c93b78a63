//! Plain-text rendering of backend results.

use legalqa_core::models::{DriftRecord, MetricSeries, MetricsWindow};
use legalqa_core::utils::truncate_chars;

/// Width of the question column in the drift table
const QUESTION_COLUMN_WIDTH: usize = 48;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn answer(text: &str) -> String {
    format!("Answer\n------\n{}\n", text.trim())
}

pub fn metric_table(window: MetricsWindow, series: &MetricSeries) -> String {
    let mut out = format!("{} metrics\n", window.title());
    if series.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    out.push_str(&format!(
        "  {:<12} {:>7} {:>9} {:>9} {:>9} {:>8}\n",
        "bucket", "count", "avg s", "median s", "p95 s", "tokens"
    ));
    for (bucket, point) in series {
        out.push_str(&format!(
            "  {:<12} {:>7} {:>9.2} {:>9.2} {:>9.2} {:>8.0}\n",
            bucket,
            point.count,
            point.avg_response_time,
            point.median_response_time,
            point.p95_response_time,
            point.input_tokens
        ));
    }
    out
}

pub fn metric_summary(summary: &serde_json::Value) -> String {
    let mut out = String::from("Overall\n");
    match summary.as_object() {
        Some(map) if !map.is_empty() => {
            for (key, value) in map {
                out.push_str(&format!("  {}: {}\n", key, value));
            }
        }
        _ => out.push_str("  (no data)\n"),
    }
    out
}

pub fn drift_table(records: &[DriftRecord]) -> String {
    if records.is_empty() {
        return "No drift records in range\n".to_string();
    }
    let mut out = format!(
        "{:<10} {:<width$} {:<5} {:<11} {}\n",
        "id",
        "question",
        "drift",
        "token drift",
        "timestamp",
        width = QUESTION_COLUMN_WIDTH
    );
    for record in records {
        out.push_str(&format!(
            "{:<10} {:<width$} {:<5} {:<11} {}\n",
            truncate_chars(&record.question_id, 10),
            truncate_chars(&record.question, QUESTION_COLUMN_WIDTH),
            yes_no(record.metrics.drift),
            yes_no(record.metrics.token_drift),
            record.timestamp_display(),
            width = QUESTION_COLUMN_WIDTH
        ));
        if !record.answer_comparison.identical && !record.answer_comparison.diff.is_empty() {
            for line in record.answer_comparison.diff.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use legalqa_core::models::MetricPoint;

    #[test]
    fn test_empty_drift_table() {
        assert_eq!(drift_table(&[]), "No drift records in range\n");
    }

    #[test]
    fn test_drift_table_shows_diff_for_changed_answers() {
        let record: DriftRecord = serde_json::from_str(
            r#"{"question_id": "q1", "question": "Q?", "metrics": {"drift": true},
                "answer_comparison": {"identical": false, "diff": "- old\n+ new"}}"#,
        )
        .expect("Failed to parse drift JSON");
        let table = drift_table(&[record]);
        assert!(table.contains("q1"));
        assert!(table.contains("    - old\n    + new\n"));
        assert!(table.contains("N/A"));
    }

    #[test]
    fn test_metric_table_lists_buckets_in_order() {
        let mut series = MetricSeries::new();
        series.insert(
            "2024-05-02".to_string(),
            MetricPoint {
                count: 2,
                ..MetricPoint::default()
            },
        );
        series.insert("2024-05-01".to_string(), MetricPoint::default());
        let table = metric_table(MetricsWindow::Daily, &series);
        let first = table.find("2024-05-01").expect("first bucket");
        let second = table.find("2024-05-02").expect("second bucket");
        assert!(first < second);
        assert!(table.starts_with("Daily metrics\n"));
    }

    #[test]
    fn test_metric_summary_empty() {
        assert_eq!(metric_summary(&serde_json::json!({})), "Overall\n  (no data)\n");
    }
}
