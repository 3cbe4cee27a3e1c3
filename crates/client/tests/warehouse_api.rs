//! Client tests against a throwaway HTTP server with canned answers.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use parking_lot::Mutex;
use shelfscan_client::WarehouseClient;
use shelfscan_core::{AuthError, Authenticator, LookupError, MoveError, MoveRequest, MoveService};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct RecordedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct CannedServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl CannedServer {
    /// Answer one connection per canned response, in order.
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                recorded.lock().push(request);

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { addr, requests }
    }

    fn client(&self, max_retries: u32) -> WarehouseClient {
        WarehouseClient::new(
            format!("http://{}", self.addr),
            Duration::from_secs(5),
            max_retries,
        )
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            let (k, v) = line.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    RecordedRequest {
        request_line,
        headers,
        body,
    }
}

const ITEM_WITH_LOCATION: &str = r#"{"success":true,"item":{"id":"item123","name":"Bolt M6","sku":"BLT-M6","quantity":200,"location":{"id":"location1","code":"A1"}}}"#;

fn move_request() -> MoveRequest {
    MoveRequest {
        item_id: "item123".to_string(),
        to_location_id: "B2".to_string(),
        user_id: "user1".to_string(),
        notes: "ok".to_string(),
    }
}

#[tokio::test]
async fn test_lookup_item_parses_location() {
    let server = CannedServer::start(vec![(200, ITEM_WITH_LOCATION)]).await;
    let client = server.client(0);

    let info = client.lookup_item("item123").await.unwrap();
    assert_eq!(info.name, "Bolt M6");
    assert_eq!(info.location_code.as_deref(), Some("A1"));

    let requests = server.requests();
    assert_eq!(requests[0].request_line, "GET /api/item/item123 HTTP/1.1");
    assert!(requests[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_lookup_item_not_found() {
    let server =
        CannedServer::start(vec![(404, r#"{"success":false,"error":"Item not found"}"#)]).await;
    let client = server.client(2);

    let err = client.lookup_item("item999").await.unwrap_err();
    assert_eq!(err, LookupError::NotFound("item999".to_string()));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_lookup_encodes_identifier() {
    let server = CannedServer::start(vec![(200, ITEM_WITH_LOCATION)]).await;
    let client = server.client(0);

    client.lookup_item("bin 4/7").await.unwrap();
    assert_eq!(
        server.requests()[0].request_line,
        "GET /api/item/bin%204%2F7 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_login_attaches_bearer_token() {
    let server = CannedServer::start(vec![
        (
            200,
            r#"{"success":true,"message":"ok","user_id":"user1","username":"operator1","role":"operator","token":"bearer_user1"}"#,
        ),
        (200, ITEM_WITH_LOCATION),
    ])
    .await;
    let client = server.client(0);

    let session = client.login("operator1", "password123").await.unwrap();
    assert_eq!(session.user_id, "user1");
    assert_eq!(session.role, "operator");
    assert!(client.is_authenticated());

    client.lookup_item("item123").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].request_line, "POST /api/login HTTP/1.1");
    let login_body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(login_body["username"], "operator1");
    assert_eq!(login_body["password"], "password123");
    assert_eq!(requests[1].header("authorization"), Some("Bearer bearer_user1"));

    client.logout().await;
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_rejected() {
    let server =
        CannedServer::start(vec![(401, r#"{"success":false,"error":"Wrong password"}"#)]).await;
    let client = server.client(0);

    let err = client.login("operator1", "nope").await.unwrap_err();
    assert_eq!(err, AuthError::Rejected("Wrong password".to_string()));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_record_move_sends_pair() {
    let server =
        CannedServer::start(vec![(200, r#"{"success":true,"message":"Item moved"}"#)]).await;
    let client = server.client(0);

    client.record_move(&move_request()).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].request_line, "POST /api/move HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["item_id"], "item123");
    assert_eq!(body["to_location_id"], "B2");
    assert_eq!(body["user_id"], "user1");
    assert_eq!(body["notes"], "ok");
}

#[tokio::test]
async fn test_record_move_rejected_by_backend() {
    let server = CannedServer::start(vec![(
        404,
        r#"{"success":false,"error":"Target location not found"}"#,
    )])
    .await;
    let client = server.client(0);

    let err = client.record_move(&move_request()).await.unwrap_err();
    assert_eq!(err, MoveError::Rejected("Target location not found".to_string()));
}

#[tokio::test]
async fn test_record_move_server_error_is_not_retried() {
    let server = CannedServer::start(vec![
        (500, r#"{"success":false,"error":"History write failed"}"#),
        (200, r#"{"success":true}"#),
    ])
    .await;
    let client = server.client(2);

    let err = client.record_move(&move_request()).await.unwrap_err();
    assert_eq!(err, MoveError::Rejected("History write failed".to_string()));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_lookup_retries_server_error() {
    let server = CannedServer::start(vec![
        (503, r#"{"error":"busy"}"#),
        (200, ITEM_WITH_LOCATION),
    ])
    .await;
    let client = server.client(1);

    let info = client.lookup_item("item123").await.unwrap();
    assert_eq!(info.id, "item123");
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WarehouseClient::new(format!("http://{}", addr), Duration::from_secs(2), 0);
    let err = client.lookup_item("item123").await.unwrap_err();
    assert!(matches!(err, LookupError::Request(_)));
}

#[tokio::test]
async fn test_item_history_newest_first() {
    let server = CannedServer::start(vec![(
        200,
        r#"{"success":true,"item_id":"item1","total":2,"movements":[
            {"id":1,"item_id":"item1","from_location_id":"location1","to_location_id":"location2","user_id":"user1","notes":"","moved_at":"2026-01-01T09:00:00Z"},
            {"id":2,"item_id":"item1","from_location_id":"location2","to_location_id":"location3","user_id":"user1","notes":"later","moved_at":"2026-01-02T09:00:00Z"}
        ]}"#,
    )])
    .await;
    let client = server.client(0);

    let movements = client.item_history("item1").await.unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0].id, 2);
    assert_eq!(movements[0].notes, "later");
    assert_eq!(
        server.requests()[0].request_line,
        "GET /api/item/item1/history HTTP/1.1"
    );
}

#[tokio::test]
async fn test_health() {
    let server = CannedServer::start(vec![(
        200,
        r#"{"status":"ok","message":"Warehouse API is running"}"#,
    )])
    .await;
    let client = server.client(0);

    let health = client.health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.message, "Warehouse API is running");
}
