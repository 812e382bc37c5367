//! Shared mock upstreams and gateway bootstrapping for integration tests.
#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::stream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};

use llm_gateway::config::{ApiKey, ProxyConfig, UpstreamConfig};
use llm_gateway::net::BoundedListener;
use llm_gateway::{HttpServer, Shutdown};

pub const SSE_CHUNKS: [&str; 3] = [
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
    "data: [DONE]\n\n",
];

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Mock upstream state: every request it received, plus a gate that holds
/// the second half of `/v1/gated-stream` until released.
#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub gate: Arc<Notify>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no request")
    }
}

/// Start the recording upstream on an ephemeral port.
///
/// Routes, by path:
/// - `/v1/stream`: three SSE events
/// - `/v1/gated-stream`: one SSE event, then a second after `gate` fires
/// - `/v1/large`: 256 KiB of patterned bytes
/// - `/status/418`: teapot with a plain body
/// - `/redirect`: 302 to `/elsewhere`
/// - anything else: JSON `{"ok":true}` with two cookies
pub async fn start_recording_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .fallback(record_and_respond)
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorder)
}

async fn record_and_respond(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    recorder.requests.lock().unwrap().push(RecordedRequest {
        method,
        uri: uri.clone(),
        headers,
        body,
    });

    match uri.path() {
        "/v1/stream" => {
            let chunks = SSE_CHUNKS
                .into_iter()
                .map(|c| Ok::<_, Infallible>(Bytes::from_static(c.as_bytes())));
            event_stream(Body::from_stream(stream::iter(chunks)))
        }
        "/v1/gated-stream" => {
            let gate = recorder.gate.clone();
            let chunks = stream::unfold(0u8, move |step| {
                let gate = gate.clone();
                async move {
                    match step {
                        0 => Some((Ok::<_, Infallible>(Bytes::from_static(b"data: first\n\n")), 1)),
                        1 => {
                            gate.notified().await;
                            Some((Ok(Bytes::from_static(b"data: second\n\n")), 2))
                        }
                        _ => None,
                    }
                }
            });
            event_stream(Body::from_stream(chunks))
        }
        "/v1/large" => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            large_payload(),
        )
            .into_response(),
        "/status/418" => (StatusCode::IM_A_TEAPOT, "short and stout").into_response(),
        "/redirect" => (StatusCode::FOUND, [(header::LOCATION, "/elsewhere")]).into_response(),
        _ => {
            let mut response = (
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"ok":true}"#,
            )
                .into_response();
            let headers = response.headers_mut();
            headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
            headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
            response
        }
    }
}

fn event_stream(body: Body) -> Response {
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

pub fn large_payload() -> Vec<u8> {
    (0..256 * 1024).map(|i| (i % 251) as u8).collect()
}

/// Start a raw TCP backend that answers every connection with `raw` and
/// closes.
pub async fn start_raw_backend(raw: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(raw.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that sends an event-stream head and one event, then holds
/// the connection open. The receiver resolves once the gateway closes its
/// side of that connection.
pub async fn start_holding_stream_backend() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  content-type: text/event-stream\r\n\
                  transfer-encoding: chunked\r\n\
                  \r\n\
                  e\r\ndata: partial\n\r\n",
            )
            .await
            .unwrap();

        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config suitable for tests: no system proxy, short timeouts.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.gateway.use_system_proxy = false;
    config.timeouts.connect_secs = 2;
    config.timeouts.response_secs = 5;
    config.timeouts.idle_secs = 5;
    config
}

pub fn upstream_at(addr: SocketAddr, key: Option<&str>) -> UpstreamConfig {
    UpstreamConfig::new(Some(format!("http://{}/", addr)), key.map(ApiKey::new))
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: ProxyConfig, upstream: UpstreamConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config.clone(), upstream).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener = BoundedListener::new(listener, config.listener.max_connections);
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
