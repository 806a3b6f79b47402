//! HTTP middleware for the Themekit server.
//!
//! Two groups live here:
//!
//! - the transport stack from [`build_http_layers`] (request ids, tracing,
//!   compression, CORS, timeout), applied to every route;
//! - request-context middleware that creates the per-request
//!   [`RequestThemeContext`] and optionally pre-warms it before the theme
//!   handlers run.
//!
//! Layers are listed outermost first: the first layer sees the request first
//! and the response last.

use axum::extract::{Request, State};
use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use themekit_core::RequestThemeContext;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::config::NetworkConfig;
use super::handlers::{request_host, AppState, ThemeRejection};

/// The composed Tower layer type produced by [`build_http_layers`].
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        TimeoutLayer,
        tower::layer::util::Stack<
            CorsLayer,
            tower::layer::util::Stack<
                CompressionLayer,
                tower::layer::util::Stack<
                    TraceLayer<
                        tower_http::classify::SharedClassifier<
                            tower_http::classify::ServerErrorsAsFailures,
                        >,
                    >,
                    tower::layer::util::Stack<
                        SetRequestIdLayer<MakeRequestUuid>,
                        tower::layer::util::Identity,
                    >,
                >,
            >,
        >,
    >,
>;

/// Builds the transport middleware stack from the network configuration.
///
/// **Order (outermost to innermost):**
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id`
/// 2. `Tracing` -- request/response trace spans
/// 3. `Compression` -- gzip for stylesheet and JSON bodies
/// 4. `CORS` -- allowed origins from configuration, `GET`/`HEAD` only
/// 5. `Timeout` -- 408 after `request_timeout`
/// 6. `PropagateRequestId` -- copies `X-Request-Id` to the response
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// A `"*"` entry allows any origin; otherwise unparseable origins are skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers(Any)
}

/// Creates the request's [`RequestThemeContext`] and stamps its tenant.
///
/// Runs for every request. Only the resolver stage runs here; token loading
/// is left to [`prewarm_theme_middleware`] or the handlers.
pub async fn resolve_tenant_middleware(mut req: Request, next: Next) -> Response {
    let host = request_host(&req);
    let mut ctx = RequestThemeContext::new();
    let tenant = ctx.resolve_tenant(host.as_deref());
    debug!(%tenant, host = host.as_deref().unwrap_or_default(), "tenant resolved");
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Loads tokens and derives CSS into the request context before the handler.
///
/// A failed load short-circuits with the error response; the handler is not
/// called.
pub async fn prewarm_theme_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let host = request_host(&req);
    let mut ctx = req
        .extensions_mut()
        .remove::<RequestThemeContext>()
        .unwrap_or_default();

    if let Err(err) = ctx.run(host.as_deref(), state.source.as_ref()).await {
        return ThemeRejection(err).into_response();
    }
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Counts the request as in flight for graceful shutdown.
pub async fn track_in_flight_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let _guard = state.shutdown.in_flight_guard();
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn build_http_layers_does_not_panic_with_defaults() {
        let _layers = build_http_layers(&NetworkConfig::default());
    }

    #[test]
    fn build_http_layers_with_custom_timeout() {
        let config = NetworkConfig {
            request_timeout: Duration::from_secs(5),
            ..NetworkConfig::default()
        };
        let _layers = build_http_layers(&config);
    }

    #[test]
    fn build_cors_layer_accepts_wildcard_and_lists() {
        let _any = build_cors_layer(&["*".to_string()]);
        let _list = build_cors_layer(&[
            "http://localhost:3000".to_string(),
            "not a header value\n".to_string(),
        ]);
    }
}
