use std::net::SocketAddr;

use chrono::{TimeZone, Utc};
use reqwest::Url;
use sensorfeed::config::Credentials;
use sensorfeed::gateway::RestGateway;
use sensorfeed::{GatewayError, IngestionGateway, Reading};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Accept one HTTP request, answer with `status_line` and `body`, and hand
/// back the raw request text.
async fn serve_once(status_line: &'static str, body: String) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(header_end) = find_header_end(&buf) {
                let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&buf).to_string()
    });

    (addr, handle)
}

fn gateway_for(addr: SocketAddr) -> RestGateway {
    let credentials = Credentials {
        base_url: Url::parse(&format!("http://{addr}")).unwrap(),
        api_key: "test-key".into(),
    };
    RestGateway::new(&credentials).unwrap()
}

fn readings() -> Vec<Reading> {
    (0..2)
        .map(|hour| Reading {
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap(),
            temperature: 23.5,
            humidity: 50.0,
            pressure: 1011.0,
            light: 350.0,
        })
        .collect()
}

#[tokio::test]
async fn posts_rows_with_postgrest_headers() {
    let batch = readings();
    let rows: Vec<serde_json::Value> = batch
        .iter()
        .enumerate()
        .map(|(i, reading)| {
            let mut row = serde_json::to_value(reading).unwrap();
            row["id"] = serde_json::json!(i + 1);
            row
        })
        .collect();
    let (addr, server) = serve_once("201 Created", serde_json::to_string(&rows).unwrap()).await;

    let inserted = gateway_for(addr).submit(&batch).await.unwrap();
    assert_eq!(inserted, batch);

    let request = server.await.unwrap();
    let lowered = request.to_lowercase();
    assert!(lowered.starts_with("post /rest/v1/sensor_data http/1.1"));
    assert!(lowered.contains("apikey: test-key"));
    assert!(lowered.contains("authorization: bearer test-key"));
    assert!(lowered.contains("prefer: return=representation"));
    assert!(lowered.contains("content-type: application/json"));
    assert!(request.contains(r#""timestamp":"2026-10-18T01:00:00.000Z""#));
}

#[tokio::test]
async fn rejected_insert_carries_status_and_message() {
    let body = r#"{"code":"42501","message":"permission denied for table sensor_data"}"#;
    let (addr, _server) = serve_once("401 Unauthorized", body.to_string()).await;

    match gateway_for(addr).submit(&readings()).await {
        Err(GatewayError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "permission denied for table sensor_data");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (addr, _server) = serve_once("201 Created", "not json".to_string()).await;

    let err = gateway_for(addr).submit(&readings()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway_for(addr).submit(&readings()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn committed_rows_with_naive_timestamps_still_count() {
    let batch = readings();
    let rows: Vec<serde_json::Value> = batch
        .iter()
        .enumerate()
        .map(|(i, reading)| {
            serde_json::json!({
                "id": i + 1,
                "timestamp": reading.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "temperature": reading.temperature,
                "humidity": reading.humidity,
                "pressure": reading.pressure,
                "light": reading.light,
            })
        })
        .collect();
    let (addr, _server) = serve_once("201 Created", serde_json::to_string(&rows).unwrap()).await;

    let inserted = gateway_for(addr).submit(&batch).await.unwrap();
    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted, batch);
}
