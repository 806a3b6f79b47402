//! HTTP handler definitions for the Themekit server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors), the error response for failed token loads, and re-exports
//! all handler functions for building the router.

pub mod health;
pub mod theme;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use theme::{stylesheet_handler, theme_handler, ThemeRejection};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::header;
use themekit_core::TokenSource;

use super::{NetworkConfig, ShutdownController};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references so cloning is cheap. Nothing here is request
/// scoped: per-request theming state lives in the request extensions.
#[derive(Clone)]
pub struct AppState {
    /// Read-only token storage backend.
    pub source: Arc<dyn TokenSource>,
    /// Lifecycle state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server configuration.
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

/// Host the request was addressed to: the `Host` header, else the URI
/// authority (HTTP/2 requests carry it there).
#[must_use]
pub fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| req.uri().host())
        .map(str::to_owned)
}
