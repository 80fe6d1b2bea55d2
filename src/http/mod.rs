//! HTTP transport for the mock
//!
//! A single method-agnostic endpoint: every path and HTTP method reaches the dispatcher.

pub mod handlers;
