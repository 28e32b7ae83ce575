//! Local SQLite sink, for offline runs.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::Database;
use crate::models::Reading;

use super::{ensure_non_empty, GatewayError, IngestionGateway};

#[derive(Clone)]
pub struct SqliteGateway {
    db: Database,
}

impl SqliteGateway {
    pub fn open(path: PathBuf) -> Result<Self> {
        Ok(Self {
            db: Database::new(path)?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl IngestionGateway for SqliteGateway {
    async fn submit(&self, readings: &[Reading]) -> Result<Vec<Reading>, GatewayError> {
        ensure_non_empty(readings)?;
        self.db
            .insert_readings(readings)
            .await
            .map_err(|err| GatewayError::Storage(format!("{err:#}")))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
