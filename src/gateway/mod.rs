//! Ingestion gateway: the only way readings leave this crate.
//!
//! A call persists the whole batch or nothing. Generators treat any error as
//! a failed call and never retry it themselves.

pub mod rest;
pub mod sqlite;

pub use rest::RestGateway;
pub use sqlite::SqliteGateway;

use async_trait::async_trait;

use crate::models::Reading;

/// Collection (table) every reading is written to.
pub const SENSOR_TABLE: &str = "sensor_data";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("refusing to submit an empty batch")]
    EmptyBatch,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("insert rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("could not decode inserted rows: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait IngestionGateway: Send + Sync {
    /// Insert a non-empty, ordered batch and return the rows the store confirms.
    async fn submit(&self, readings: &[Reading]) -> Result<Vec<Reading>, GatewayError>;
    /// Short name for logs (e.g. "rest", "sqlite").
    fn name(&self) -> &str;
}

pub(crate) fn ensure_non_empty(readings: &[Reading]) -> Result<(), GatewayError> {
    if readings.is_empty() {
        return Err(GatewayError::EmptyBatch);
    }
    Ok(())
}
