//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::create_router;
use super::state::AppState;
use crate::error::{Result, ScamguardError};

/// HTTP server for the quiz API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Handler state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server fails.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// In-flight requests are drained once the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "Failed to bind HTTP listener");
            ScamguardError::Io(e)
        })?;

        info!(addr = %self.addr, "Starting HTTP server");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                ScamguardError::Server(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedGenerator;
    use crate::generation::GenerationGateway;
    use crate::quiz::{MemoryLeaderboard, QuizCatalog};
    use crate::ratelimit::{AdmissionController, RateLimitConfig, RateLimitRegistry};
    use crate::retry::ResilientInvoker;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            AdmissionController::new(Arc::new(RateLimitRegistry::new())),
            RateLimitConfig::new(10, 60_000),
            GenerationGateway::new(Arc::new(ScriptedGenerator::default()), ResilientInvoker::default()),
            Arc::new(QuizCatalog::new(Vec::new())),
            Arc::new(MemoryLeaderboard::new()),
        )
    }

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:8081".parse().unwrap();
        let server = HttpServer::new(addr, state());
        assert_eq!(server.addr(), addr);
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = HttpServer::new(addr, state());

        let result = server.serve_with_shutdown(async {}).await;
        assert!(result.is_ok());
    }
}
