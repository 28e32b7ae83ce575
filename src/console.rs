//! Human-facing stdout output. Not a stable format.

use chrono::Local;

use crate::backfill::BackfillReport;
use crate::models::Reading;
use crate::stream::{StreamEvent, StreamReport};

pub fn format_reading(reading: &Reading) -> String {
    let local = reading.timestamp.with_timezone(&Local);
    [
        format!("  {:<12} {}", "Timestamp", local.format("%Y-%m-%d %H:%M:%S")),
        format!("  {:<12} {:.2} °C", "Temperature", reading.temperature),
        format!("  {:<12} {:.2} %", "Humidity", reading.humidity),
        format!("  {:<12} {:.2} hPa", "Pressure", reading.pressure),
        format!("  {:<12} {:.2} lux", "Light", reading.light),
    ]
    .join("\n")
}

/// Text for one stream event, or `None` for events with nothing to show.
pub fn format_stream_event(event: &StreamEvent) -> Option<String> {
    match event {
        StreamEvent::Started { interval } => Some(format!(
            "Streaming sensor readings every {}s. Press Ctrl+C to stop.",
            interval.as_secs()
        )),
        StreamEvent::Submitted { total, reading, .. } => {
            Some(format!("\nReading #{total} sent:\n{}", format_reading(reading)))
        }
        StreamEvent::Failed {
            tick: Some(tick),
            reason,
        } => Some(format!("Tick {tick} failed: {reason}")),
        StreamEvent::Failed { tick: None, reason } => Some(format!("Submission failed: {reason}")),
        StreamEvent::Stopped(_) => None,
    }
}

pub fn format_stream_summary(report: &StreamReport) -> String {
    let mut summary = format!("Stopped streaming. Total readings sent: {}", report.submitted);
    if report.failed > 0 || report.abandoned > 0 {
        summary.push_str(&format!(
            " ({} failed, {} abandoned at shutdown)",
            report.failed, report.abandoned
        ));
    }
    summary
}

pub fn format_backfill_summary(report: &BackfillReport) -> String {
    format!("Backfill complete: {} sensor readings stored", report.inserted)
}
