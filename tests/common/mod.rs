//! Shared helpers for integration tests: a minimal HTTP/1.1 stub server and
//! an in-memory ZIP builder

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Build a ZIP archive in memory from `(name, content)` pairs
pub fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Canned response for one path
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Default)]
struct StubState {
    routes: HashMap<String, Route>,
    head_hits: HashMap<String, u32>,
    get_hits: HashMap<String, u32>,
    failing_heads: u32,
}

/// HTTP server answering HEAD and GET from a route table
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<Mutex<StubState>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(StubState::default()));

        let accept_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = handle_connection(stream, state).await;
                });
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Archive base URL served by this stub
    pub fn base_url(&self) -> String {
        format!("http://{}/odsele", self.addr)
    }

    pub fn serve(&self, path: &str, route: Route) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), route);
    }

    /// Answer the next `count` HEAD requests with 503
    pub fn fail_next_heads(&self, count: u32) {
        self.state.lock().unwrap().failing_heads = count;
    }

    pub fn head_hits(&self, path: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.head_hits.get(path).copied().unwrap_or(0)
    }

    pub fn get_hits(&self, path: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.get_hits.get(path).copied().unwrap_or(0)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<Mutex<StubState>>,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let mut request_line = request.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let route = {
        let mut state = state.lock().unwrap();
        let hits = if method == "HEAD" {
            &mut state.head_hits
        } else {
            &mut state.get_hits
        };
        *hits.entry(path.clone()).or_insert(0) += 1;

        if method == "HEAD" && state.failing_heads > 0 {
            state.failing_heads -= 1;
            Route {
                status: 503,
                headers: Vec::new(),
                body: b"unavailable".to_vec(),
            }
        } else {
            state.routes.get(&path).cloned().unwrap_or(Route {
                status: 404,
                headers: Vec::new(),
                body: b"not found".to_vec(),
            })
        }
    };

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    for (name, value) in &route.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");

    stream.write_all(response.as_bytes()).await?;
    if method != "HEAD" {
        stream.write_all(&route.body).await?;
    }
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
