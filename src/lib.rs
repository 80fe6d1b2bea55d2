use std::sync::Arc;

use axum::{middleware, Router};

pub mod config;
pub mod counter;
pub mod errors;
pub mod fixtures;
pub mod http;
pub mod logging;
pub mod registry;
pub mod rpc;
pub mod server;

use counter::CallCounter;
use registry::HandlerRegistry;

pub use rpc::{ErrorPayload, RpcRequest, RpcResponse};
pub use server::MockJsonRpcServer;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HandlerRegistry>,
    pub counter: Arc<CallCounter>,
}

impl AppState {
    pub fn new(registry: Arc<HandlerRegistry>, counter: Arc<CallCounter>) -> Self {
        Self { registry, counter }
    }
}

/// Every path and every HTTP method is answered by the JSON-RPC dispatcher.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .fallback(http::handlers::rpc_endpoint)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
