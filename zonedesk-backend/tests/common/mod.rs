//! Shared test helpers: assertion macros and a scriptable HTTP server.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use zonedesk_backend::{
    BackendSpec, FieldValue, RecordType, ResourceRecord, ZoneBackend, create_backend,
};

/// Assert that an `Option` is `Some` and unwrap it (fail the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert that a `Result` is `Ok` and unwrap it (fail the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    /// Path including the query string.
    pub target: String,
    pub body: String,
}

impl SeenRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

type Responder = dyn Fn(&SeenRequest) -> (u16, String) + Send + Sync;

/// HTTP server answering each request through a closure.
pub struct MockServer {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockServer {
    /// Start a server on an ephemeral port.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&SeenRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let respond = respond.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut socket).await else {
                        return;
                    };
                    log.lock().unwrap().push(request.clone());
                    let (status, body) = respond(&request);
                    let response = format!(
                        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        reason(status),
                        body.len(),
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, seen }
    }

    /// Base URL to configure a backend with.
    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(SeenRequest {
        method,
        target,
        body,
    })
}

/// JSON backend named `main` talking to `server` as remote server `ns1`.
pub fn json_backend(server: &MockServer, max_retries: u32) -> Arc<dyn ZoneBackend> {
    let spec = BackendSpec::new("json")
        .with_option("api_base", server.api_base())
        .with_option("server_sysname", "ns1")
        .with_option("timeout_secs", 5)
        .with_option("max_retries", max_retries);
    create_backend("main", &spec).unwrap()
}

/// Memory backend with the given views.
pub fn memory_backend(views: &[&str]) -> Arc<dyn ZoneBackend> {
    let spec = BackendSpec::new("memory").with_option(
        "views",
        views.iter().map(|v| (*v).to_string()).collect::<Vec<_>>(),
    );
    create_backend("scratch", &spec).unwrap()
}

pub fn a_record(name: &str, address: &str) -> ResourceRecord {
    ResourceRecord::new(
        RecordType::A,
        name,
        [("address", FieldValue::from(address))],
        3600,
        None,
    )
    .unwrap()
}

pub fn soa_record(serial: u32) -> ResourceRecord {
    ResourceRecord::new(
        RecordType::Soa,
        "@",
        [
            ("primary", FieldValue::from("ns1.example.com.")),
            ("hostmaster", FieldValue::from("hostmaster.example.com.")),
            ("serial", FieldValue::from(serial)),
            ("refresh", FieldValue::from(3600_u32)),
            ("retry", FieldValue::from(900_u32)),
            ("expire", FieldValue::from(604_800_u32)),
            ("minimum", FieldValue::from(300_u32)),
        ],
        86400,
        None,
    )
    .unwrap()
}
