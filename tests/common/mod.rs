//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use inventory_assistant::chat::{ChatBackend, ChatError, ChatOrchestrator, ChatRequest, ChatSettings};
use inventory_assistant::config::AssistantConfig;
use inventory_assistant::health::HealthRegistry;
use inventory_assistant::simulator::{Inventory, ResponseSimulator, SimulationOptions};

/// Start a programmable mock HTTP backend on an ephemeral port.
///
/// `f` receives the request body and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let body = read_request_body(&mut socket).await;
                        let (status, body) = f(body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read headers and a `Content-Length` body so the client never sees a reset.
async fn read_request_body(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::new(),
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = find(&buf, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = end + 4;
        while buf.len() < body_start + length {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body_end = buf.len().min(body_start + length);
        return String::from_utf8_lossy(&buf[body_start..body_end]).into_owned();
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// In-process backend that replays a script of results.
///
/// Once the script runs out, `fallback` is returned for every call.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, ChatError>>>,
    fallback: Result<String, ChatError>,
    latency: Duration,
    calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, ChatError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Err(ChatError::Status { status: 503 }),
            latency: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn always(result: Result<String, ChatError>) -> Self {
        Self {
            fallback: result,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Fast chat settings for tests: short delays, small retry budget.
pub fn fast_settings() -> ChatSettings {
    let mut config = AssistantConfig::default();
    config.retry.max_retries = 2;
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 100;
    config.endpoint.request_timeout_ms = 0;
    config.chat.thinking_delay_ms = 50;
    config.chat.typing_base_ms = 20;
    config.chat.typing_ms_per_char = 0;
    config.chat.typing_max_ms = 20;
    config.chat.follow_up_delay_ms = 100;
    ChatSettings::from_config(&config)
}

pub fn reliable_simulator() -> Arc<ResponseSimulator> {
    Arc::new(ResponseSimulator::with_seed(
        SimulationOptions::reliable(),
        Inventory::sample(),
        42,
    ))
}

pub fn failing_simulator() -> Arc<ResponseSimulator> {
    Arc::new(ResponseSimulator::with_seed(
        SimulationOptions {
            error_probability: 1.0,
            ..SimulationOptions::reliable()
        },
        Inventory::sample(),
        42,
    ))
}

pub fn orchestrator(
    settings: ChatSettings,
    backend: Arc<ScriptedBackend>,
    simulator: Arc<ResponseSimulator>,
) -> (ChatOrchestrator, HealthRegistry) {
    let registry = HealthRegistry::default();
    let chat = ChatOrchestrator::new(settings, backend, simulator, registry.clone());
    (chat, registry)
}
