//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use ollama_proxy::config::ProxyConfig;
use ollama_proxy::{HttpServer, Shutdown};

/// What a mock upstream sends back.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A complete response with a Content-Length body.
    Fixed {
        status: &'static str,
        content_type: Option<&'static str>,
        body: String,
    },
    /// A chunked body, one chunk per entry, with a short pause in between.
    Chunked(Vec<String>),
    /// Chunked body that is cut off (connection closed) after these chunks.
    Truncated(Vec<String>),
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        MockReply::Fixed {
            status: "200 OK",
            content_type: Some("application/json; charset=utf-8"),
            body: body.to_string(),
        }
    }
}

/// A request as the mock upstream received it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a mock upstream on an ephemeral port.
///
/// Every request it receives is pushed onto the returned channel.
pub async fn start_mock_upstream(
    reply: MockReply,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let reply = Arc::new(reply);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let reply = reply.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        serve_one(socket, &reply, &tx).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn serve_one(
    mut socket: TcpStream,
    reply: &MockReply,
    tx: &mpsc::UnboundedSender<CapturedRequest>,
) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    let _ = tx.send(request);

    match reply {
        MockReply::Fixed {
            status,
            content_type,
            body,
        } => {
            let content_type = content_type
                .map(|ct| format!("Content-Type: {}\r\n", ct))
                .unwrap_or_default();
            let response = format!(
                "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
        MockReply::Chunked(chunks) => {
            write_chunked_head(&mut socket).await;
            for chunk in chunks {
                write_chunk(&mut socket, chunk).await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        }
        MockReply::Truncated(chunks) => {
            write_chunked_head(&mut socket).await;
            for chunk in chunks {
                write_chunk(&mut socket, chunk).await;
            }
        }
    }
    let _ = socket.shutdown().await;
}

async fn write_chunked_head(socket: &mut TcpStream) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\n\
                Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
    let _ = socket.write_all(head.as_bytes()).await;
}

async fn write_chunk(socket: &mut TcpStream, chunk: &str) {
    let frame = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
    let _ = socket.write_all(frame.as_bytes()).await;
    let _ = socket.flush().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

/// An `http://` base URL nothing listens on.
pub async fn dead_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Start the proxy against `upstream_base` on an ephemeral port.
pub async fn start_proxy(upstream_base: &str) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.base_url = upstream_base.to_string();

    let listener = ollama_proxy::net::bind(&config.listener).unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Assert the three CORS headers are present.
pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}
