//! One-shot historical seeding: `lookback_hours` hourly readings ending at
//! `now`, written with a single bulk call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gateway::{GatewayError, IngestionGateway};
use crate::models::Reading;
use crate::signal::SignalModel;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub prepared: usize,
    pub inserted: usize,
}

/// Readings for offsets `lookback_hours - 1 ..= 0`, oldest first. Every
/// timestamp derives from the same `now`, so spacing is exactly one hour.
pub fn build_batch(model: &mut SignalModel, now: DateTime<Utc>, lookback_hours: u32) -> Vec<Reading> {
    (0..lookback_hours)
        .rev()
        .map(|hours_ago| model.reading_at(now, hours_ago))
        .collect()
}

/// Exactly one gateway call; no retry.
pub async fn submit_batch(
    gateway: &dyn IngestionGateway,
    batch: &[Reading],
) -> Result<BackfillReport, GatewayError> {
    log_info!(
        "submitting backfill batch of {} readings via {}",
        batch.len(),
        gateway.name()
    );

    match gateway.submit(batch).await {
        Ok(inserted) => {
            let report = BackfillReport {
                prepared: batch.len(),
                inserted: inserted.len(),
            };
            log_info!("backfill stored {} rows", report.inserted);
            Ok(report)
        }
        Err(err) => {
            log_error!("backfill batch failed: {err}");
            Err(err)
        }
    }
}

pub async fn run_backfill(
    gateway: &dyn IngestionGateway,
    model: &mut SignalModel,
    now: DateTime<Utc>,
    lookback_hours: u32,
) -> Result<BackfillReport, GatewayError> {
    let batch = build_batch(model, now, lookback_hours);
    submit_batch(gateway, &batch).await
}
