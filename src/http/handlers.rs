//! Axum handler turning each HTTP exchange into exactly one JSON-RPC response
//!
//! Every failure before the handler result exists is answered with an error envelope on the
//! same exchange. Errors travel in the envelope, the HTTP status stays `200 OK`.
//! Handlers are plain blocking closures and run on the blocking pool, one per exchange.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{HeaderName, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use tokio::task;
use tracing::{debug, error};

use crate::{
    errors::{EncodeError, HandlerError},
    rpc::{decode_request, encode_response, error_payload, RpcResponse},
    AppState,
};

/// Diagnostic header copied from the request onto the response.
pub const TEST_HEADER: &str = "test";

/// JSON-RPC method of a decoded request, attached to the response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcMethod(pub String);

/// Result of running one request body through the pipeline.
#[derive(Debug)]
pub struct Dispatch {
    /// `None` when the body could not be decoded.
    pub method: Option<String>,
    /// `Err` only when the handler's result could not be encoded.
    pub outcome: Result<RpcResponse, EncodeError>,
}

pub async fn rpc_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut response_headers = HeaderMap::new();
    response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(value) = headers.get(TEST_HEADER) {
        response_headers.insert(HeaderName::from_static(TEST_HEADER), value.clone());
    }

    let Dispatch { method, outcome } = dispatch(&state, &body).await;
    let mut response = match outcome.and_then(|response| encode_response(&response)) {
        Ok(body) => (StatusCode::OK, response_headers, body).into_response(),
        Err(err) => {
            // Nothing usable to send; the client sees an empty 200 body.
            error!(error = %err, method = method.as_deref(), "error writing response");
            (StatusCode::OK, response_headers).into_response()
        }
    };
    if let Some(method) = method {
        response.extensions_mut().insert(RpcMethod(method));
    }
    response
}

/// Runs the decode, route, count, invoke pipeline for one request body.
pub async fn dispatch(state: &AppState, body: &[u8]) -> Dispatch {
    let request = match decode_request(body) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "rejecting malformed request");
            return Dispatch {
                method: None,
                outcome: Ok(RpcResponse::parse_failure(&err)),
            };
        }
    };

    let method = request.method.clone();
    let id = request.id.clone();

    let Some(handler) = state.registry.lookup(&method) else {
        debug!(method = %method, "no handler registered");
        let message = format!("no RPC method handler implemented for {method}");
        return Dispatch {
            method: Some(method),
            outcome: Ok(RpcResponse::failure(id, error_payload(&message))),
        };
    };

    state.counter.increment(&method);

    let outcome = match task::spawn_blocking(move || handler(&request)).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => Err(HandlerError::Panicked {
            method: method.clone(),
            message: panic_message(err.into_panic().as_ref()),
        }),
        Err(err) => Err(HandlerError::failed(format!(
            "handler for {method} did not complete: {err}"
        ))),
    };

    let outcome = match outcome {
        Ok(result) => {
            debug!(method = %method, "handler succeeded");
            Ok(RpcResponse::success(id, result))
        }
        Err(HandlerError::Encode(err)) => Err(err),
        Err(err) => {
            debug!(method = %method, error = %err, "handler failed");
            Ok(RpcResponse::failure(id, error_payload(&err)))
        }
    };

    Dispatch {
        method: Some(method),
        outcome,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
