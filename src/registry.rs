//! Method name to handler routing table

use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, RwLock},
};

use serde::Serialize;
use serde_json::Value;

use crate::{
    errors::{EncodeError, HandlerError},
    rpc::RpcRequest,
};

/// Type-erased handler stored in the registry.
pub type RpcHandler = dyn Fn(&RpcRequest) -> Result<Value, HandlerError> + Send + Sync;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<RpcHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method`, replacing any earlier registration.
    ///
    /// Any serializable success value and any displayable error are accepted; the
    /// value is converted to JSON when the handler runs.
    pub fn set_handler<F, T, E>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&RpcRequest) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Display,
    {
        let handler: Arc<RpcHandler> = Arc::new(move |request: &RpcRequest| {
            let value = handler(request).map_err(|err| HandlerError::failed(err.to_string()))?;
            serde_json::to_value(value)
                .map_err(|err| HandlerError::from(EncodeError::new("handler result", err)))
        });
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(method.into(), handler);
    }

    pub fn remove(&self, method: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(method)
            .is_some()
    }

    /// Exact, case-sensitive lookup. The handle is cloned out so the caller
    /// invokes it without holding the lock.
    pub fn lookup(&self, method: &str) -> Option<Arc<RpcHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(method)
            .cloned()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.lookup(method).is_some()
    }

    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        methods.sort();
        methods
    }
}
