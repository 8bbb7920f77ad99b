//! HTTP API tests driven through the router without a socket.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use clap::Parser;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

use pcapstreams::cli::Args;
use pcapstreams::server::{router, AppState, ServerConfig};
use pcapstreams_core::protocol::tcp_flags;
use pcapstreams_core::protocol::test_utils::{build_tcp_packet, PcapFileBuilder};
use pcapstreams_core::{RawPacket, UploadState};

const ORIGIN: &str = "http://localhost:3000";
const BOUNDARY: &str = "pcapstreams-test-boundary";

fn setup(upload_dir: &std::path::Path, max_upload_size: usize) -> (AppState, Router) {
    let config = ServerConfig {
        upload_dir: upload_dir.to_path_buf(),
        max_upload_size,
        allowed_origin: HeaderValue::from_static(ORIGIN),
    };
    let state = AppState::new(config.upload_dir.clone());
    let app = router(state.clone(), &config);
    (state, app)
}

/// File `count` TCP packets from distinct client ports into the index.
fn seed(state: &AppState, count: u64) {
    for i in 1..=count {
        let data = build_tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 1000 + i as u16, 80, tcp_flags::SYN, &[]);
        let len = data.len() as u32;
        let packet = RawPacket::new(i, 0, len, len, 1, data);
        state.index.append(state.normalizer.normalize(i, &packet));
    }
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload-pcap")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_unknown_stream_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = setup(dir.path(), 1024 * 1024);
    seed(&state, 1);

    let response = get(&app, "/stream/1.2.3.4:5%20-%3E%206.7.8.9:10").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Stream not found");
}

#[tokio::test]
async fn test_stream_lookup_by_either_direction() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = setup(dir.path(), 1024 * 1024);
    seed(&state, 3);

    for uri in [
        "/stream/10.0.0.1:1002%20-%3E%2010.0.0.2:80",
        "/stream/10.0.0.2:80%20-%3E%2010.0.0.1:1002",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        let json = body_json(response).await;
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["packets"][0]["index"], 2);
        assert_eq!(json["packets"][0]["src_port"], 1002);
        assert_eq!(json["packets"][0]["info"], "TCP Packet");
    }
}

#[tokio::test]
async fn test_packets_normalizes_bad_paging() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = setup(dir.path(), 1024 * 1024);
    // 60 packets are filed under two keys each: 120 entries
    seed(&state, 60);

    for uri in ["/packets?page=0&limit=-5", "/stream/?page=0&limit=-5"] {
        let json = body_json(get(&app, uri).await).await;
        let packets = json["packets"].as_array().unwrap();
        assert_eq!(packets.len(), 50, "{uri}");
        assert_eq!(json["totalPages"], 3, "{uri}");
        assert_eq!(packets[0]["index"], 1);
        assert_eq!(packets[49]["index"], 25);
    }

    let json = body_json(get(&app, "/packets?page=abc&limit=xyz").await).await;
    assert_eq!(json["packets"].as_array().unwrap().len(), 50);

    let json = body_json(get(&app, "/packets?page=9&limit=50").await).await;
    assert!(json["packets"].as_array().unwrap().is_empty());
    assert_eq!(json["totalPages"], 3);
}

#[tokio::test]
async fn test_streams_lists_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = setup(dir.path(), 1024 * 1024);

    let json = body_json(get(&app, "/streams").await).await;
    assert_eq!(json, serde_json::json!([]));

    seed(&state, 1);
    let json = body_json(get(&app, "/streams").await).await;
    assert_eq!(
        json,
        serde_json::json!(["10.0.0.1:1001 -> 10.0.0.2:80", "10.0.0.2:80 -> 10.0.0.1:1001"])
    );
}

#[tokio::test]
async fn test_upload_ingests_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().join("uploads");
    let (state, app) = setup(&upload_dir, 1024 * 1024);

    let capture = PcapFileBuilder::new()
        .packet(1, 0, build_tcp_packet([10, 1, 1, 1], [10, 2, 2, 2], 1111, 80, tcp_flags::SYN, &[]))
        .packet(
            1,
            10,
            build_tcp_packet([10, 2, 2, 2], [10, 1, 1, 1], 80, 1111, tcp_flags::SYN | tcp_flags::ACK, &[]),
        )
        .packet(
            2,
            0,
            build_tcp_packet([10, 1, 1, 1], [10, 2, 2, 2], 1111, 80, tcp_flags::PSH | tcp_flags::ACK, b"GET /"),
        )
        .build();

    let response = app
        .clone()
        .oneshot(multipart_request("pcap", "../handshake.pcap", &capture))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "File uploaded successfully");
    assert_eq!(json["filename"], "handshake.pcap");
    let upload_id = json["upload_id"].as_u64().unwrap();

    assert_eq!(std::fs::read(upload_dir.join("handshake.pcap")).unwrap(), capture);

    let mut status = None;
    for _ in 0..200 {
        match state.uploads.get(upload_id) {
            Some(s) if s.state != UploadState::Pending => {
                status = Some(s);
                break;
            }
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    assert_eq!(status.map(|s| s.state), Some(UploadState::Done { packets: 3 }));

    let json = body_json(get(&app, "/stream/10.1.1.1:1111%20-%3E%2010.2.2.2:80").await).await;
    let indices: Vec<u64> = json["packets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(json["packets"][2]["payload_hex"], "474554202f");

    let json = body_json(get(&app, "/uploads").await).await;
    assert_eq!(json[0]["state"], "done");
    assert_eq!(json[0]["packets"], 3);
}

#[tokio::test]
async fn test_upload_without_pcap_field() {
    let dir = tempfile::tempdir().unwrap();
    let (_, app) = setup(dir.path(), 1024 * 1024);

    let response = app
        .clone()
        .oneshot(multipart_request("other", "x.pcap", b"data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Failed to retrieve file");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-pcap")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Failed to retrieve file");
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = setup(dir.path(), 1024);

    let response = app
        .clone()
        .oneshot(multipart_request("pcap", "big.pcap", &vec![0u8; 8192]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "File size too large");
    assert!(state.uploads.list().is_empty());
    assert!(!dir.path().join("big.pcap").exists());
}

#[tokio::test]
async fn test_cors_preflight() {
    let dir = tempfile::tempdir().unwrap();
    let (_, app) = setup(dir.path(), 1024);

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/upload-pcap")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        HeaderValue::from_static(ORIGIN)
    );
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("POST") && methods.contains("OPTIONS"));

    let response = app
        .clone()
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_access_log_visible_at_default_filter() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let default_filter = Args::try_parse_from(["pcapstreams"]).unwrap().log_filter();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(default_filter))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = setup(dir.path(), 1024);
    let response = get(&app, "/stream/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("finished processing request"), "log was: {text}");
    assert!(text.contains("status=404"), "log was: {text}");
}
