use std::time::Duration;

use serde::Serialize;

use crate::models::Reading;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum StreamStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Idle => "idle",
            StreamStatus::Running => "running",
            StreamStatus::Stopped => "stopped",
        }
    }
}

/// Final accounting for one stream run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreamReport {
    pub ticks: u64,
    pub submitted: u64,
    pub failed: u64,
    /// Submissions still outstanding when the drain window closed.
    pub abandoned: u64,
}

#[derive(Debug, Clone)]
pub enum StreamEvent {
    Started {
        interval: Duration,
    },
    Submitted {
        tick: u64,
        total: u64,
        reading: Reading,
    },
    Failed {
        /// `None` when the submission task itself died.
        tick: Option<u64>,
        reason: String,
    },
    Stopped(StreamReport),
}
