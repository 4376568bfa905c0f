//! Common test utilities
//!
//! - `Upstream` - stub photo record service on a random port
//! - `GalleryTest` - real gallery server wired to an upstream

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use gallery::feed::FetchState;
use gallery::{Config, Server};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Canned upstream response
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
    /// Wait for `Upstream::release` before answering
    pub hold: bool,
}

impl Reply {
    /// 200 with a JSON body
    pub fn json(body: serde_json::Value) -> Self {
        Self::raw(&body.to_string())
    }

    /// 200 with an arbitrary body
    pub fn raw(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
            hold: false,
        }
    }

    /// Error status with an empty JSON object
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::raw("{}")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn held(mut self) -> Self {
        self.hold = true;
        self
    }
}

struct UpstreamState {
    replies: Vec<Reply>,
    released: watch::Receiver<bool>,
    hits: AtomicUsize,
}

/// Stub photo service answering `/photos/{n}` with the n-th reply (1-based)
pub struct Upstream {
    pub addr: SocketAddr,
    state: Arc<UpstreamState>,
    release_tx: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

impl Upstream {
    pub async fn start(replies: Vec<Reply>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (release_tx, released) = watch::channel(false);
        let state = Arc::new(UpstreamState {
            replies,
            released,
            hits: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/photos/{id}", get(photo))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Upstream error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            release_tx,
            _handle: handle,
        })
    }

    /// Endpoint URLs in reply order
    pub fn endpoints(&self) -> Vec<String> {
        (1..=self.state.replies.len())
            .map(|n| format!("http://{}/photos/{}", self.addr, n))
            .collect()
    }

    /// Let held replies through
    pub fn release(&self) {
        let _ = self.release_tx.send(true);
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

async fn photo(Path(id): Path<usize>, State(state): State<Arc<UpstreamState>>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let Some(reply) = id
        .checked_sub(1)
        .and_then(|index| state.replies.get(index))
        .cloned()
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if reply.hold {
        let mut released = state.released.clone();
        let _ = released.wait_for(|released| *released).await;
    }
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

/// Test harness that spawns a real gallery server on a random port
pub struct GalleryTest {
    pub addr: SocketAddr,
    pub client: Client,
    pub upstream: Upstream,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl GalleryTest {
    /// Start an upstream with `replies` and a gallery pointed at it
    pub async fn start(replies: Vec<Reply>) -> Result<Self> {
        let upstream = Upstream::start(replies).await?;
        let config = Config {
            endpoints: upstream.endpoints(),
            ..Config::default()
        };
        Self::start_with_config(upstream, config).await
    }

    /// Start a gallery with an explicit config; the bind address is replaced
    pub async fn start_with_config(upstream: Upstream, mut config: Config) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);
        config.bind_addr = addr;

        let server = Arc::new(Server::new(config)?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            upstream,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Wait for the feed to leave `Loading`
    pub async fn settled(&self) -> FetchState {
        tokio::time::timeout(Duration::from_secs(5), self.server.feed().settled())
            .await
            .expect("feed did not settle within 5 seconds")
    }

    /// Fetch the rendered page body
    pub async fn page(&self) -> Result<String> {
        Ok(self.get("/").await?.text().await?)
    }

    /// Fetch the rendered fragment inside the root element
    pub async fn fragment(&self) -> Result<String> {
        let page = self.page().await?;
        let start = page
            .find("<div id=\"root\">")
            .map(|i| i + "<div id=\"root\">".len())
            .ok_or_else(|| anyhow::anyhow!("no root element in page"))?;
        let end = page
            .rfind("</div>\n</body>")
            .ok_or_else(|| anyhow::anyhow!("no closing root element in page"))?;
        Ok(page[start..end].to_string())
    }

    /// Fetch the JSON state snapshot
    pub async fn state_json(&self) -> Result<serde_json::Value> {
        Ok(self.get("/state").await?.json().await?)
    }

    /// Get the server instance
    pub fn server(&self) -> Arc<Server> {
        self.server.clone()
    }
}

impl Drop for GalleryTest {
    fn drop(&mut self) {
        self.upstream.release();
        self.server.shutdown();
    }
}
