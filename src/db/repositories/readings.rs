use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{
    helpers::{conversion_error, parse_datetime, to_u64},
    Database,
};
use crate::models::{reading::to_iso_millis, Reading};

impl Database {
    /// Insert the whole batch in one transaction and return the stored rows.
    pub async fn insert_readings(&self, readings: &[Reading]) -> Result<Vec<Reading>> {
        let records = readings.to_vec();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO sensor_data (
                        timestamp,
                        temperature,
                        humidity,
                        pressure,
                        light
                    ) VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;

                for record in &records {
                    stmt.execute(params![
                        to_iso_millis(&record.timestamp),
                        record.temperature,
                        record.humidity,
                        record.pressure,
                        record.light,
                    ])
                    .with_context(|| {
                        format!("failed to insert reading at {}", record.timestamp_iso())
                    })?;
                }
            }
            tx.commit().context("failed to commit readings")?;
            Ok(records)
        })
        .await
    }

    pub async fn count_readings(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))
                .context("failed to count readings")?;
            to_u64(count, "count")
        })
        .await
    }

    /// Most recent `limit` readings, oldest first.
    pub async fn list_readings(&self, limit: u32) -> Result<Vec<Reading>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp, temperature, humidity, pressure, light
                 FROM (
                     SELECT id, timestamp, temperature, humidity, pressure, light
                     FROM sensor_data
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?1
                 )
                 ORDER BY timestamp ASC, id ASC",
            )?;

            let rows = stmt.query_map(params![limit], |row| {
                let timestamp_str: String = row.get(0)?;
                let timestamp =
                    parse_datetime(&timestamp_str, "timestamp").map_err(conversion_error)?;

                Ok(Reading {
                    timestamp,
                    temperature: row.get(1)?,
                    humidity: row.get(2)?,
                    pressure: row.get(3)?,
                    light: row.get(4)?,
                })
            })?;

            let mut readings = Vec::new();
            for reading_result in rows {
                readings.push(reading_result?);
            }

            Ok(readings)
        })
        .await
    }
}
