//! filebridge Server
//!
//! HTTP service that lets a browser extension list the projects of the
//! open solution, browse a project's folders and drop files into it.

pub mod error;
pub mod handlers;
pub mod host;
pub mod pane;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, DefaultBodyLimit, Request},
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use filebridge_core::{BridgeConfig, ProjectHost, ProjectKind, WorkspaceHost};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use handlers::{resolve_target, Resolution, ResolvedProject};
pub use host::{ContextError, HostContext};
pub use pane::OutputPane;

/// Upload bodies above this size are rejected
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl From<&BridgeConfig> for ServerConfig {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            port: config.server.port,
            host: config.server.host.clone(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state
pub struct AppState {
    /// Serialized access to the host project model
    pub host: HostContext,

    /// Directory names skipped by folder listings
    pub excluded_dirs: Vec<String>,

    /// Project kinds accepted by the buildable-kind fallback
    pub buildable_kinds: Vec<ProjectKind>,
}

impl AppState {
    pub fn new(host: HostContext, config: &BridgeConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            excluded_dirs: config.folders.excluded.clone(),
            buildable_kinds: config.resolver.buildable_kinds.clone(),
        })
    }

    /// Spawn a host context for `host` and wrap it in state
    pub fn with_host<H>(host: H, config: &BridgeConfig) -> std::io::Result<Arc<Self>>
    where
        H: ProjectHost + 'static,
    {
        Ok(Self::new(HostContext::spawn(host)?, config))
    }
}

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", post(handlers::handle_upload).options(handlers::handle_fallback))
        .route(
            "/projects",
            get(handlers::handle_projects)
                .head(handlers::handle_fallback)
                .options(handlers::handle_fallback),
        )
        .route(
            "/folders",
            get(handlers::handle_folders)
                .head(handlers::handle_fallback)
                .options(handlers::handle_fallback),
        )
        .route("/health", get(handlers::handle_health).head(handlers::handle_fallback))
        .fallback(handlers::handle_fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Log every request with a per-request id
async fn log_request(request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!("Received {} request to {} from {}", method, path, remote);
    let response = next.run(request).await;
    tracing::debug!(request_id = %id, "Completed {} {} with {}", method, path, response.status());
    response
}

/// Listener startup failures
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Port {port} is already in use. Stop the other instance or choose a different port.")]
    PortInUse { port: u16 },

    #[error("Failed to start listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the listener, turning "address in use" into a clear diagnostic
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.addr();
    TcpListener::bind(&addr).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::AddrInUse {
            ServerError::PortInUse { port: config.port }
        } else {
            ServerError::Bind { addr, source }
        }
    })
}

/// Running server started with [`start_server`]
pub struct ServerHandle {
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    join: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.stop.send(true);
        self.join.await.context("Server task failed")??;
        tracing::info!("File receiver stopped");
        Ok(())
    }
}

/// Bind and serve in a background task
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<ServerHandle, ServerError> {
    let listener = bind_listener(config).await?;
    let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: config.addr(),
        source,
    })?;

    let (stop, mut stopped) = watch::channel(false);
    let router = create_router(state);
    let join = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                let _ = stopped.wait_for(|stop| *stop).await;
            })
            .await
    });

    tracing::info!("File receiver started on http://{}", local_addr);
    Ok(ServerHandle { local_addr, stop, join })
}

/// Run the service in the foreground until `shutdown` resolves
pub async fn run_server<F>(config: BridgeConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let server_config = ServerConfig::from(&config);
    let host = WorkspaceHost::new(&config.workspace);
    let state = AppState::with_host(host, &config).context("Failed to start host context")?;

    let handle = match start_server(&server_config, state).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    shutdown.await;
    tracing::info!("Shutting down file receiver");
    handle.stop().await
}
