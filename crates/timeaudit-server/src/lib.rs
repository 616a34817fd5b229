//! HTTP front end for timeaudit.
//!
//! Exposes the audit over HTTP:
//!
//! - `POST /api/audit` - multipart CSV upload, optional `big_task_hours` query
//! - `GET /api/health` - liveness probe
//! - `GET /reports/...` - persisted report files
//!
//! Every upload is persisted into its own run directory under the configured
//! output location.

mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use timeaudit_core::{Clock, DEFAULT_OUTPUT_DIR, DEFAULT_RETENTION_HOURS, SystemClock};

pub use routes::{AppState, MAX_UPLOAD_BYTES, router};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is unusable.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The output location could not be prepared.
    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server loop failed.
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base location for run directories, also served under `/reports`.
    pub output_dir: PathBuf,
    pub retention_hours: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }
}

impl ServerConfig {
    /// `host:port` string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Run the server until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    serve_with_clock(config, Arc::new(SystemClock)).await
}

/// Run the server with an explicit time source.
pub async fn serve_with_clock(
    config: ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<(), ServerError> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| ServerError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;

    let state = Arc::new(AppState {
        output_dir: config.output_dir.clone(),
        retention_hours: config.retention_hours,
        clock,
    });
    let app = router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local: SocketAddr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
