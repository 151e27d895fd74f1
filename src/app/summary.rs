use crate::domain::run::RunMode;

use super::run::RunSummary;

pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let stats = &summary.stats;
    let mut lines = Vec::new();
    lines.push("Results:".to_owned());
    lines.push(format!("  Target: {}", summary.config.target_url));
    match summary.config.mode {
        RunMode::Count(total) => lines.push(format!("  Mode: count ({} requests)", total.get())),
        RunMode::Duration(duration) => lines.push(format!(
            "  Mode: duration ({:.1}s)",
            duration.as_secs_f64()
        )),
    }
    lines.push(format!(
        "  Concurrency: {} (peak in flight {})",
        summary.config.concurrency.get(),
        summary.peak_in_flight
    ));
    lines.push(format!(
        "  Payload size: {} bytes",
        summary.config.payload_size.get()
    ));
    lines.push(format!("  Total requests: {}", stats.total));
    lines.push(format!("  Successful: {}", stats.successful));
    lines.push(format!("  Failed: {}", stats.failed));
    lines.push(format!("  Test duration: {:.3}s", stats.elapsed_secs));
    lines.push(format!("  Requests/sec: {:.2}", stats.requests_per_sec));
    lines.push(format!("  Avg response time: {:.6}s", stats.avg_time));
    lines.push(format!(
        "  Min response time: {}",
        format_opt_secs(stats.min_time)
    ));
    lines.push(format!(
        "  Max response time: {}",
        format_opt_secs(stats.max_time)
    ));
    lines.push(format!("  Total bytes: {}", stats.total_bytes));
    lines.push(format!("  Bytes/sec: {:.2}", stats.bytes_per_sec));
    lines.push(format!("  Bandwidth: {:.3} Mbps", stats.mbps));

    match summary.server.as_ref() {
        Some(server) => {
            lines.push("Server statistics:".to_owned());
            lines.push(format!("  Total requests: {}", server.total_requests));
            lines.push(format!("  Total bytes: {}", server.total_bytes));
            lines.push(format!("  Uptime: {:.3}s", server.uptime_seconds));
            lines.push(format!(
                "  Requests/sec: {:.2}",
                server.requests_per_second
            ));
            lines.push(format!("  Bytes/sec: {:.2}", server.bytes_per_second));
            lines.push(format!("  Bandwidth: {:.3} Mbps", server.mb_per_second));
        }
        None => lines.push("Server statistics: unavailable".to_owned()),
    }
    lines
}

fn format_opt_secs(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |secs| format!("{:.6}s", secs))
}
