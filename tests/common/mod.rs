#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sensorfeed::{GatewayError, IngestionGateway, Reading};
use tokio::time::Instant;

#[derive(Default)]
struct GatewayLog {
    calls: usize,
    call_times: Vec<Instant>,
    batch_sizes: Vec<usize>,
    stored: Vec<Reading>,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory gateway whose failures and latency are fixed up front.
#[derive(Default)]
pub struct ScriptedGateway {
    /// 1-based call numbers that fail.
    fail_calls: HashSet<usize>,
    /// 1-based call numbers that panic.
    panic_calls: HashSet<usize>,
    delay: Duration,
    log: Mutex<GatewayLog>,
}

impl ScriptedGateway {
    pub fn always_ok() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn panicking_on(calls: &[usize]) -> Self {
        Self {
            panic_calls: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().calls
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().call_times.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.log.lock().unwrap().batch_sizes.clone()
    }

    pub fn stored(&self) -> Vec<Reading> {
        self.log.lock().unwrap().stored.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.log.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl IngestionGateway for ScriptedGateway {
    async fn submit(&self, readings: &[Reading]) -> Result<Vec<Reading>, GatewayError> {
        let call = {
            let mut log = self.log.lock().unwrap();
            log.calls += 1;
            log.call_times.push(Instant::now());
            log.batch_sizes.push(readings.len());
            log.in_flight += 1;
            log.max_in_flight = log.max_in_flight.max(log.in_flight);
            log.calls
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut log = self.log.lock().unwrap();
        log.in_flight -= 1;

        if self.panic_calls.contains(&call) {
            drop(log);
            panic!("scripted panic on call {call}");
        }
        if self.fail_calls.contains(&call) {
            return Err(GatewayError::Rejected {
                status: 503,
                message: format!("scripted failure on call {call}"),
            });
        }

        log.stored.extend_from_slice(readings);
        Ok(readings.to_vec())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
