//! Lifecycle of a mock JSON-RPC server instance
//!
//! Each instance owns its own registry, counters and listener, so any number of mocks can run
//! side by side in one test process.

use std::{collections::HashMap, fmt::Display, net::SocketAddr, sync::Arc};

use serde::Serialize;
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tracing::{error, info};

use crate::{
    build_app,
    config::{ConfigError, ServerConfig},
    counter::CallCounter,
    fixtures::{install_fixtures, Fixtures},
    registry::HandlerRegistry,
    rpc::RpcRequest,
    AppState,
};

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

pub struct MockJsonRpcServer {
    state: AppState,
    local_addr: SocketAddr,
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MockJsonRpcServer {
    /// Starts listening on an ephemeral loopback port.
    pub async fn start() -> Result<Self, StartError> {
        Self::start_with_config(&ServerConfig::default()).await
    }

    pub async fn start_with_config(config: &ServerConfig) -> Result<Self, StartError> {
        let addr = config.bind_socket()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StartError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartError::Bind { addr, source })?;

        let state = AppState::new(Arc::new(HandlerRegistry::new()), Arc::new(CallCounter::new()));
        let app = build_app(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
            if let Err(err) = serve.await {
                error!(error = %err, addr = %local_addr, "mock server stopped with error");
            }
        });

        info!(addr = %local_addr, "mock JSON-RPC server listening");

        Ok(Self {
            state,
            local_addr,
            url: format!("http://{local_addr}"),
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Base URL, stable for the lifetime of the instance.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Registers or replaces the handler for `method`. Safe while serving.
    pub fn set_handler<F, T, E>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&RpcRequest) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Display,
    {
        self.state.registry.set_handler(method, handler);
    }

    pub fn remove_handler(&self, method: &str) -> bool {
        self.state.registry.remove(method)
    }

    pub fn install_fixtures(&self, fixtures: Fixtures) {
        install_fixtures(&self.state.registry, fixtures);
    }

    /// Only meaningful once the requests being counted have received their responses.
    pub fn call_count(&self, method: &str) -> u64 {
        self.state.counter.get(method)
    }

    pub fn call_counts(&self) -> HashMap<String, u64> {
        self.state.counter.snapshot()
    }

    pub fn total_calls(&self) -> u64 {
        self.state.counter.total()
    }

    pub fn reset_counts(&self) {
        self.state.counter.reset();
    }

    /// Closes the listener and waits for in-flight exchanges to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!(error = %err, "mock server task failed");
            }
        }
        info!(addr = %self.local_addr, "mock JSON-RPC server stopped");
    }
}

impl Drop for MockJsonRpcServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
