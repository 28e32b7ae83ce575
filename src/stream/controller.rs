use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::StreamConfig;
use crate::gateway::IngestionGateway;
use crate::signal::SignalModel;

use super::loop_worker::stream_loop;
use super::state::{StreamEvent, StreamReport, StreamStatus};

/// Owns one stream run: `Idle -> Running -> Stopped`.
pub struct StreamController {
    status: StreamStatus,
    handle: Option<JoinHandle<StreamReport>>,
    cancel_token: CancellationToken,
    final_report: Option<StreamReport>,
    join_failure: Option<String>,
}

impl StreamController {
    pub fn new() -> Self {
        Self {
            status: StreamStatus::Idle,
            handle: None,
            cancel_token: CancellationToken::new(),
            final_report: None,
            join_failure: None,
        }
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Token that stops the ticker when cancelled; hand it to signal handlers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn start(
        &mut self,
        gateway: Arc<dyn IngestionGateway>,
        model: SignalModel,
        config: StreamConfig,
        events: Option<UnboundedSender<StreamEvent>>,
    ) -> Result<()> {
        if self.status != StreamStatus::Idle {
            bail!("stream is {}, it can only be started once", self.status.as_str());
        }

        let token_clone = self.cancel_token.clone();
        let handle = tokio::spawn(stream_loop(gateway, model, config, events, token_clone));

        self.handle = Some(handle);
        self.status = StreamStatus::Running;
        Ok(())
    }

    /// Stop scheduling new ticks. Safe to call any number of times.
    pub fn cancel(&self) {
        if !self.cancel_token.is_cancelled() {
            info!("Cancelling stream ticker");
        }
        self.cancel_token.cancel();
    }

    /// Cancel, wait for the loop to drain, and return the final report.
    /// Later calls return the same report, or the same failure.
    pub async fn stop(&mut self) -> Result<StreamReport> {
        if let Some(report) = self.final_report {
            return Ok(report);
        }
        if let Some(reason) = &self.join_failure {
            bail!("stream loop task failed to join: {reason}");
        }

        self.cancel();
        let joined = match self.handle.take() {
            Some(handle) => handle.await,
            None => Ok(StreamReport::default()),
        };
        self.status = StreamStatus::Stopped;

        match joined {
            Ok(report) => {
                self.final_report = Some(report);
                Ok(report)
            }
            Err(join_err) => {
                let reason = join_err.to_string();
                self.join_failure = Some(reason.clone());
                Err(join_err).context("stream loop task failed to join")
            }
        }
    }
}

impl Default for StreamController {
    fn default() -> Self {
        Self::new()
    }
}
