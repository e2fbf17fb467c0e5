//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use wayfinder_static::{BuildConfig, BuildError, BuildResult, StaticBuilder};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

const RELOAD_PATH: &str = "/__reload";
const RELOAD_SCRIPT_PATH: &str = "/__reload.js";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build configuration
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    AddressError(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),
}

/// Shared server state.
struct ServerState {
    builder: StaticBuilder,
    hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    ///
    /// Pages are served from the root and get the live reload script injected.
    pub fn new(mut config: DevServerConfig) -> Self {
        config.build.base_url = "/".to_string();
        config.build.live_reload = Some(RELOAD_SCRIPT_PATH.to_string());
        Self { config }
    }

    /// Paths watched for changes.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let build = &self.config.build;
        let mut paths = vec![build.content_dir.clone()];
        paths.extend(build.templates_dir.clone());
        paths.extend(build.styles.iter().cloned());
        paths
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::AddressError(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let output_dir = self.config.build.output_dir.clone();
        let state = Arc::new(RwLock::new(ServerState {
            builder: StaticBuilder::new(self.config.build.clone()),
            hub: ReloadHub::new(),
        }));

        // Initial build must succeed before serving anything
        rebuild(&state).await?;

        let (watcher, mut rx) = FileWatcher::new(&self.watch_paths())
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route(RELOAD_PATH, get(ws_handler))
            .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .with_state(state);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Rebuild the site and tell connected pages about the outcome.
async fn rebuild(state: &Arc<RwLock<ServerState>>) -> Result<BuildResult, BuildError> {
    let state = state.read().await;

    match state.builder.build().await {
        Ok(result) => {
            tracing::info!(
                "Built {} pages ({} sidebar entries) in {}ms",
                result.pages,
                result.entries,
                result.duration_ms
            );
            state.hub.send(ReloadMessage::Reload);
            Ok(result)
        }
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
            Err(e)
        }
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &Arc<RwLock<ServerState>>, event: WatchEvent) {
    {
        let state = state.read().await;
        let output_dir = &state.builder.config().output_dir;
        // notify reports absolute paths; the configured output dir may be relative.
        let canonical = output_dir.canonicalize().unwrap_or_else(|_| output_dir.clone());
        if event.path().starts_with(output_dir) || event.path().starts_with(&canonical) {
            return;
        }
    }

    match &event {
        WatchEvent::ContentModified(path) => {
            tracing::info!("Content modified: {}", path.display());
        }
        WatchEvent::StylesheetModified(path) => {
            tracing::info!("Stylesheet modified: {}", path.display());
        }
        WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => {
            tracing::debug!("Changed: {}", path.display());
        }
    }

    // Failures are already reported to the pages and the log
    let _ = rebuild(state).await;
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RwLock<ServerState>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<RwLock<ServerState>>) {
    let mut rx = {
        let state = state.read().await;
        state.hub.subscribe()
    };

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    let script = reload_client_script(RELOAD_PATH);
    ([("content-type", "application/javascript")], script)
}
