use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::get,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tubescript_core::{FallbackChain, TranscriptCache, TranscriptSource};

use crate::{error::panic_response, handlers};

pub const TRANSCRIPT_PATH: &str = "/api/transcript";

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TranscriptSource>,
    pub chain: Arc<FallbackChain>,
    pub cache: Option<Arc<TranscriptCache>>,
}

impl AppState {
    pub fn new(source: Arc<dyn TranscriptSource>, chain: FallbackChain) -> Self {
        Self {
            source,
            chain: Arc::new(chain),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Option<TranscriptCache>) -> Self {
        self.cache = cache.map(Arc::new);
        self
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            TRANSCRIPT_PATH,
            get(handlers::get_transcript).options(handlers::preflight),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Bind and start serving in the background.
pub async fn start(addr: SocketAddr, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let router = build_router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "server stopped with error");
        }
    });

    tracing::info!(addr = %local_addr, "tubescript server started");

    Ok(ServerHandle {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        server,
    })
}

/// Handle returned by `start()`. Dropping it also stops the server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.server.await {
            tracing::error!(error = %e, "server task failed");
        }
    }
}
