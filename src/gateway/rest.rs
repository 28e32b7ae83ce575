//! PostgREST-compatible insert endpoint (the Supabase REST API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::Credentials;
use crate::models::Reading;

use super::{ensure_non_empty, GatewayError, IngestionGateway, SENSOR_TABLE};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct RestGateway {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl RestGateway {
    pub fn new(credentials: &Credentials) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: table_endpoint(&credentials.base_url, SENSOR_TABLE)?,
            api_key: credentials.api_key.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl IngestionGateway for RestGateway {
    async fn submit(&self, readings: &[Reading]) -> Result<Vec<Reading>, GatewayError> {
        ensure_non_empty(readings)?;

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(readings)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        let rows: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let inserted = decode_rows(rows, readings);
        log_info!(
            "inserted {} of {} rows into {}",
            inserted.len(),
            readings.len(),
            SENSOR_TABLE
        );
        Ok(inserted)
    }

    fn name(&self) -> &str {
        "rest"
    }
}

/// `{base}/rest/v1/{table}`, keeping any path prefix on the base URL.
pub fn table_endpoint(base_url: &Url, table: &str) -> Result<Url, GatewayError> {
    let mut endpoint = base_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| GatewayError::Transport(format!("'{base_url}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(endpoint)
}

/// A returned row whose columns don't decode (e.g. a `timestamp` without
/// time zone) is replaced by the reading sent at the same position.
fn decode_rows(rows: Vec<Value>, sent: &[Reading]) -> Vec<Reading> {
    rows.into_iter()
        .zip(sent)
        .map(|(row, reading)| {
            serde_json::from_value(row).unwrap_or_else(|err| {
                log_warn!("returned row did not decode ({err}); using submitted values");
                reading.clone()
            })
        })
        .collect()
}

/// PostgREST puts a human-readable reason in `message`; fall back to the raw body.
fn rejection(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });

    GatewayError::Rejected {
        status: status.as_u16(),
        message,
    }
}
