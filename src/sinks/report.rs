use std::path::Path;

use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::AggregateStats;

use super::format::{format_opt_secs, format_secs, write_line};

/// Renders the key=value report, one key per line.
///
/// # Errors
///
/// Returns an error if a line cannot be formatted.
pub fn render_report(stats: &AggregateStats) -> AppResult<String> {
    let mut output = String::new();
    let entries = [
        ("total_requests", stats.total.to_string()),
        ("successful_requests", stats.successful.to_string()),
        ("failed_requests", stats.failed.to_string()),
        ("test_duration", format_secs(stats.elapsed_secs)),
        ("requests_per_sec", format_secs(stats.requests_per_sec)),
        ("avg_response_time", format_secs(stats.avg_time)),
        ("min_response_time", format_opt_secs(stats.min_time)),
        ("max_response_time", format_opt_secs(stats.max_time)),
        ("total_bytes", stats.total_bytes.to_string()),
        ("bytes_per_sec", format_secs(stats.bytes_per_sec)),
        ("bandwidth_mbps", format_secs(stats.mbps)),
    ];
    for (key, value) in entries {
        write_line(&mut output, &format!("{}={}", key, value))?;
    }
    Ok(output)
}

/// Writes the report to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered or written.
pub async fn write_report(path: &Path, stats: &AggregateStats) -> AppResult<()> {
    let output = render_report(stats)?;
    tokio::fs::write(path, output).await.map_err(|err| {
        AppError::sink(SinkError::WriteReport {
            path: path.to_path_buf(),
            source: err,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::future::Future;
    use tempfile::tempdir;

    fn stats(min_time: Option<f64>) -> AggregateStats {
        AggregateStats {
            total: 3,
            successful: 2,
            failed: 1,
            total_bytes: 300,
            elapsed_secs: 1.0,
            avg_time: 0.15,
            min_time,
            max_time: min_time.map(|_min| 0.2),
            requests_per_sec: 2.0,
            bytes_per_sec: 300.0,
            mbps: 0.002_288_818,
        }
    }

    fn parse_report(text: &str) -> Result<BTreeMap<String, String>, String> {
        text.lines()
            .map(|line| {
                line.split_once('=')
                    .map(|(key, value)| (key.to_owned(), value.to_owned()))
                    .ok_or_else(|| format!("line without '=': {}", line))
            })
            .collect()
    }

    fn run_async_test<F>(future: F) -> Result<(), String>
    where
        F: Future<Output = Result<(), String>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| format!("Failed to build runtime: {}", err))?;
        runtime.block_on(future)
    }

    #[test]
    fn report_has_every_key_in_order() -> Result<(), String> {
        let text = render_report(&stats(Some(0.1))).map_err(|err| err.to_string())?;
        let keys: Vec<&str> = text
            .lines()
            .filter_map(|line| line.split_once('=').map(|(key, _)| key))
            .collect();
        let expected = [
            "total_requests",
            "successful_requests",
            "failed_requests",
            "test_duration",
            "requests_per_sec",
            "avg_response_time",
            "min_response_time",
            "max_response_time",
            "total_bytes",
            "bytes_per_sec",
            "bandwidth_mbps",
        ];
        if keys != expected {
            return Err(format!("Unexpected keys {:?}", keys));
        }
        let values = parse_report(&text)?;
        if values.get("total_bytes").map(String::as_str) != Some("300") {
            return Err("Unexpected total_bytes".to_owned());
        }
        if values.get("min_response_time").map(String::as_str) != Some("0.100000") {
            return Err("Unexpected min_response_time".to_owned());
        }
        Ok(())
    }

    #[test]
    fn undefined_extremes_are_not_numbers() -> Result<(), String> {
        let text = render_report(&stats(None)).map_err(|err| err.to_string())?;
        let values = parse_report(&text)?;
        if values.get("min_response_time").map(String::as_str) != Some("n/a")
            || values.get("max_response_time").map(String::as_str) != Some("n/a")
        {
            return Err(format!("Expected n/a extremes in:\n{}", text));
        }
        Ok(())
    }

    #[test]
    fn write_report_creates_file() -> Result<(), String> {
        run_async_test(async {
            let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
            let path = dir.path().join("results.txt");
            write_report(&path, &stats(Some(0.1)))
                .await
                .map_err(|err| err.to_string())?;
            let text = std::fs::read_to_string(&path).map_err(|err| err.to_string())?;
            if !text.starts_with("total_requests=3\n") {
                return Err(format!("Unexpected report:\n{}", text));
            }
            Ok(())
        })
    }
}
