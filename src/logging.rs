use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use crate::http::handlers::{RpcMethod, TEST_HEADER};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Installs a subscriber for tests; repeated calls are ignored.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// One summary line per exchange, tagged with the JSON-RPC method and the
/// `Test` correlation header when present.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let http_method = request.method().clone();
    let path = request.uri().path().to_string();
    let test_case = request
        .headers()
        .get(TEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let started_at = Instant::now();

    let response = next.run(request).await;
    let rpc_method = response
        .extensions()
        .get::<RpcMethod>()
        .map(|RpcMethod(method)| method.as_str());

    debug!(
        http_method = %http_method,
        path = %path,
        rpc_method,
        test_case = test_case.as_deref(),
        status = response.status().as_u16(),
        duration_ms = started_at.elapsed().as_millis(),
        "rpc exchange"
    );

    response
}
