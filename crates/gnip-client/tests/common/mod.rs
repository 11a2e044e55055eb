//! In-process mock of the Gnip rules and stream endpoints

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures_util::stream;
use gnip_client::{Credential, Endpoints, GnipClient};
use tokio::sync::mpsc;

pub const USERNAME: &str = "gnip-user";
pub const PASSWORD: &str = "gnip-pass";
pub const ACCOUNT: &str = "acme";
/// `Basic base64("gnip-user:gnip-pass")`
pub const EXPECTED_AUTHORIZATION: &str = "Basic Z25pcC11c2VyOmduaXAtcGFzcw==";

pub const RULES_PATH: &str =
    "/accounts/acme/publishers/twitter/streams/track/Production/rules.json";
pub const REPLAY_RULES_PATH: &str =
    "/accounts/acme/publishers/twitter/replay/track/Production/rules.json";
pub const STREAM_PATH: &str = "/accounts/acme/publishers/twitter/streams/track/Production.json";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    rules_response: (StatusCode, String),
    mutation_status: StatusCode,
    stream_status: StatusCode,
    stream_rx: Mutex<Option<mpsc::UnboundedReceiver<io::Result<Bytes>>>>,
}

pub struct MockGnipBuilder {
    rules_response: (StatusCode, String),
    mutation_status: StatusCode,
    stream_status: StatusCode,
}

impl MockGnipBuilder {
    pub fn rules_response(mut self, status: StatusCode, body: &str) -> Self {
        self.rules_response = (status, body.to_string());
        self
    }

    pub fn mutation_status(mut self, status: StatusCode) -> Self {
        self.mutation_status = status;
        self
    }

    pub fn stream_status(mut self, status: StatusCode) -> Self {
        self.stream_status = status;
        self
    }

    pub async fn start(self) -> MockGnip {
        let (stream_tx, stream_rx) = mpsc::unbounded_channel();
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            rules_response: self.rules_response,
            mutation_status: self.mutation_status,
            stream_status: self.stream_status,
            stream_rx: Mutex::new(Some(stream_rx)),
        });

        let router = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        MockGnip {
            addr,
            state,
            stream_tx: Some(stream_tx),
        }
    }
}

pub struct MockGnip {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    stream_tx: Option<mpsc::UnboundedSender<io::Result<Bytes>>>,
}

impl MockGnip {
    pub fn builder() -> MockGnipBuilder {
        MockGnipBuilder {
            rules_response: (StatusCode::OK, r#"{"rules":[]}"#.to_string()),
            mutation_status: StatusCode::CREATED,
            stream_status: StatusCode::OK,
        }
    }

    pub async fn start() -> Self {
        Self::builder().start().await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> GnipClient {
        client_for(&self.base_url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Queue bytes on the open stream body
    pub fn push_stream(&self, data: &'static str) {
        if let Some(tx) = &self.stream_tx {
            tx.send(Ok(Bytes::from_static(data.as_bytes()))).unwrap();
        }
    }

    /// Abort the stream body mid-transfer; the server drops the connection
    pub fn fail_stream(&mut self) {
        if let Some(tx) = self.stream_tx.take() {
            tx.send(Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream reset")))
                .unwrap();
        }
    }

    /// End the stream body
    pub fn finish_stream(&mut self) {
        self.stream_tx = None;
    }
}

pub fn client_for(base_url: &str) -> GnipClient {
    GnipClient::with_endpoints(
        Credential::new(USERNAME, PASSWORD),
        ACCOUNT,
        &Endpoints::single_host(base_url),
    )
    .unwrap()
}

/// Base URL of a port with nothing listening on it
pub async fn refused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body,
    });

    if uri.path().ends_with("/Production.json") {
        if !state.stream_status.is_success() {
            return (state.stream_status, "stream unavailable").into_response();
        }
        let rx = state.stream_rx.lock().unwrap().take();
        let Some(rx) = rx else {
            return (StatusCode::CONFLICT, "stream already connected").into_response();
        };
        let chunks = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from_stream(chunks))
            .unwrap();
    }

    if method == Method::GET {
        let (status, body) = state.rules_response.clone();
        return (status, body).into_response();
    }

    (state.mutation_status, "").into_response()
}
