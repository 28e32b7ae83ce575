use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::StreamConfig;
use crate::gateway::{GatewayError, IngestionGateway};
use crate::models::Reading;
use crate::signal::SignalModel;

use super::state::{StreamEvent, StreamReport};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

struct TickOutcome {
    tick: u64,
    reading: Reading,
    result: Result<Vec<Reading>, GatewayError>,
}

/// Counters owned by the loop; only joined results touch them.
#[derive(Default)]
struct StreamTally {
    report: StreamReport,
}

impl StreamTally {
    fn settle(
        &mut self,
        joined: Result<TickOutcome, JoinError>,
        events: &Option<UnboundedSender<StreamEvent>>,
    ) {
        match joined {
            Ok(TickOutcome {
                tick,
                reading,
                result: Ok(_),
            }) => {
                self.report.submitted += 1;
                log_info!(
                    "tick {} stored reading at {} (total {})",
                    tick,
                    reading.timestamp_iso(),
                    self.report.submitted
                );
                emit(
                    events,
                    StreamEvent::Submitted {
                        tick,
                        total: self.report.submitted,
                        reading,
                    },
                );
            }
            Ok(TickOutcome {
                tick,
                result: Err(err),
                ..
            }) => {
                self.report.failed += 1;
                log_warn!("tick {} dropped: {err}", tick);
                emit(
                    events,
                    StreamEvent::Failed {
                        tick: Some(tick),
                        reason: err.to_string(),
                    },
                );
            }
            Err(join_err) => {
                self.report.failed += 1;
                log_error!("submission task failed: {join_err}");
                emit(
                    events,
                    StreamEvent::Failed {
                        tick: None,
                        reason: join_err.to_string(),
                    },
                );
            }
        }
    }
}

fn emit(events: &Option<UnboundedSender<StreamEvent>>, event: StreamEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Tick every `config.interval` (first tick one interval after start) until
/// `cancel_token` fires, then drain in-flight submissions and report.
pub async fn stream_loop(
    gateway: Arc<dyn IngestionGateway>,
    mut model: SignalModel,
    config: StreamConfig,
    events: Option<UnboundedSender<StreamEvent>>,
    cancel_token: CancellationToken,
) -> StreamReport {
    let mut ticker = time::interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut in_flight: JoinSet<TickOutcome> = JoinSet::new();
    let mut tally = StreamTally::default();

    log_info!(
        "stream started: one reading every {:?} via {}",
        config.interval,
        gateway.name()
    );
    emit(
        &events,
        StreamEvent::Started {
            interval: config.interval,
        },
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("stream loop shutting down");
                break;
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                tally.settle(joined, &events);
            }
            _ = ticker.tick() => {
                tally.report.ticks += 1;
                let tick = tally.report.ticks;
                let reading = model.live_reading(Utc::now());
                let gateway = Arc::clone(&gateway);
                in_flight.spawn(async move {
                    let result = gateway.submit(std::slice::from_ref(&reading)).await;
                    TickOutcome { tick, reading, result }
                });
            }
        }
    }

    if !in_flight.is_empty() {
        log_info!(
            "draining {} in-flight submissions (up to {:?})",
            in_flight.len(),
            config.drain_timeout
        );
        let drain = async {
            while let Some(joined) = in_flight.join_next().await {
                tally.settle(joined, &events);
            }
        };
        if time::timeout(config.drain_timeout, drain).await.is_err() {
            tally.report.abandoned = in_flight.len() as u64;
            log_warn!(
                "abandoning {} submissions still in flight after {:?}",
                tally.report.abandoned,
                config.drain_timeout
            );
            in_flight.abort_all();
        }
    }

    let report = tally.report;
    log_info!(
        "stream stopped: {} ticks, {} submitted, {} failed, {} abandoned",
        report.ticks,
        report.submitted,
        report.failed,
        report.abandoned
    );
    emit(&events, StreamEvent::Stopped(report));
    report
}
