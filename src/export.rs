//! CSV export of accumulated test results.
//!
//! One header row, one data row per result in receipt order. Durations are
//! written as seconds using `f64` Display (shortest round-trip form) so the
//! numbers re-parse losslessly; timestamps are plain formatted strings.

use crate::report::TestResult;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const HEADER: &str = "model,first_token_time,total_time,success,response_length,error,timestamp";

/// Render results as a CSV document.
#[must_use]
pub fn render_csv(results: &[TestResult]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for result in results {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            quote(&result.model),
            result
                .first_token_time
                .map(|d| d.as_secs_f64().to_string())
                .unwrap_or_default(),
            result
                .total_time
                .map(|d| d.as_secs_f64().to_string())
                .unwrap_or_default(),
            result.success,
            result.response_length,
            quote(result.error.as_deref().unwrap_or("")),
            quote(&result.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
        );
    }

    out
}

/// Write results as CSV to `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be written; the in-memory results
/// are unaffected either way.
pub fn write_csv(results: &[TestResult], path: &Path) -> Result<()> {
    std::fs::write(path, render_csv(results))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = results.len(), "exported results");
    Ok(())
}

/// RFC-4180 quoting: wrap in double quotes when the field contains a comma,
/// quote, or newline, doubling any embedded quotes.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn sample() -> TestResult {
        let mut result = TestResult::success(
            "m1",
            Some(Duration::from_secs_f64(0.5)),
            Duration::from_secs_f64(1.2),
            &"x".repeat(42),
        );
        result.timestamp = Local
            .with_ymd_and_hms(2026, 8, 31, 12, 0, 0)
            .single()
            .unwrap_or_else(Local::now);
        result
    }

    #[test]
    fn test_header_and_one_row() {
        let csv = render_csv(&[sample()]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("m1,0.5,1.2,true,42,,2026-08-31 12:00:00.000")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_numeric_fields_round_trip() {
        let result = TestResult::success(
            "m1",
            Some(Duration::from_secs_f64(0.123_456_789)),
            Duration::from_secs_f64(9.876_543_21),
            "",
        );
        let csv = render_csv(&[result.clone()]);
        let row = csv.lines().nth(1).unwrap_or("");
        let fields: Vec<&str> = row.split(',').collect();

        let first: f64 = fields[1].parse().unwrap_or(f64::NAN);
        let total: f64 = fields[2].parse().unwrap_or(f64::NAN);
        let (Some(ftt), Some(tt)) = (result.first_token_time, result.total_time) else {
            panic!("sample should carry both timings");
        };
        assert_eq!(first, ftt.as_secs_f64());
        assert_eq!(total, tt.as_secs_f64());
        assert_eq!(fields[4].parse::<usize>().unwrap_or(0), 0);
    }

    #[test]
    fn test_failure_row_has_empty_times_and_error() {
        let result = TestResult::failure("m2", "HTTP status 503".to_string());
        let csv = render_csv(&[result]);
        let row = csv.lines().nth(1).unwrap_or("");
        assert!(row.starts_with("m2,,,false,0,HTTP status 503,"));
    }

    #[test]
    fn test_error_with_comma_is_quoted() {
        let result = TestResult::failure("m2", "bad, very bad".to_string());
        let csv = render_csv(&[result]);
        assert!(csv.contains("\"bad, very bad\""));
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("plain"), "plain");
    }

    #[test]
    fn test_write_csv_to_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("results.csv");
        write_csv(&[sample()], &path)?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with(HEADER));
        assert_eq!(content.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn test_write_csv_unwritable_path_is_error() {
        let path = Path::new("/nonexistent-dir/results.csv");
        assert!(write_csv(&[sample()], path).is_err());
    }

    #[test]
    fn test_rows_preserve_receipt_order() {
        let mut results = Vec::new();
        for name in ["a", "b", "c"] {
            results.push(TestResult::success(
                name,
                None,
                Duration::from_millis(10),
                "",
            ));
        }
        let csv = render_csv(&results);
        let models: Vec<String> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap_or("").to_string())
            .collect();
        assert_eq!(models, vec!["a", "b", "c"]);
    }
}
