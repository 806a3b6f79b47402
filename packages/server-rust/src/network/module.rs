//! Network module with deferred startup lifecycle.
//!
//! `new()` creates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves. The
//! bound port is known between `start()` and `serve()`, which tests and the
//! binary's startup log rely on.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use themekit_core::TokenSource;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    health_handler, liveness_handler, readiness_handler, stylesheet_handler, theme_handler,
    AppState,
};
use super::middleware::{
    build_http_layers, prewarm_theme_middleware, resolve_tenant_middleware,
    track_in_flight_middleware,
};
use super::shutdown::ShutdownController;
use crate::storage::FileTokenStore;

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` / `with_source()` -- allocates shared state
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- serves until shutdown is signalled, then drains
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    source: Arc<dyn TokenSource>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a module reading token files from `config.tokens_dir`.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        let source = Arc::new(FileTokenStore::new(config.tokens_dir.clone()));
        Self::with_source(config, source)
    }

    /// Creates a module reading tokens from an arbitrary backend.
    #[must_use]
    pub fn with_source(config: NetworkConfig, source: Arc<dyn TokenSource>) -> Self {
        Self {
            config,
            listener: None,
            source,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /api/theme` -- `{ tenantId, tokens, css }` JSON
    /// - `GET /theme.css` -- CSS variable block
    /// - `GET /health` -- detailed health JSON
    /// - `GET /health/live` -- liveness probe
    /// - `GET /health/ready` -- readiness probe
    ///
    /// Every request gets a tenant-stamped context. With `prewarm_theme`,
    /// theme routes load tokens and derive CSS in middleware.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            source: Arc::clone(&self.source),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        };

        let mut theme_routes = Router::new()
            .route("/api/theme", get(theme_handler))
            .route("/theme.css", get(stylesheet_handler));
        if self.config.prewarm_theme {
            theme_routes =
                theme_routes.route_layer(from_fn_with_state(state.clone(), prewarm_theme_middleware));
        }

        Router::new()
            .merge(theme_routes)
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .layer(from_fn(resolve_tenant_middleware))
            .layer(from_fn_with_state(state.clone(), track_in_flight_middleware))
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(
            "TCP listener bound to {}:{} (tokens from {})",
            self.config.host,
            port,
            self.config.tokens_dir.display()
        );

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// After the signal, health moves to `Draining`, axum stops accepting
    /// connections and finishes open ones, and in-flight requests get up to
    /// `drain_timeout` before the state moves to `Stopped`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called or the server hits a
    /// fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let shutdown_ctrl = Arc::clone(&self.shutdown);

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        let signal = async move {
            shutdown.await;
            info!("Shutdown signalled, draining");
            signal_ctrl.trigger_shutdown();
        };

        shutdown_ctrl.set_ready();
        info!("Serving theme requests");

        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await?;

        shutdown_ctrl.trigger_shutdown();
        if shutdown_ctrl.wait_for_drain(self.config.drain_timeout).await {
            info!("All requests drained");
        } else {
            warn!(
                in_flight = shutdown_ctrl.in_flight_count(),
                "Drain timeout expired with in-flight requests remaining"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::token_record;
    use crate::network::HealthState;
    use crate::storage::MemoryTokenStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn module(prewarm_theme: bool) -> NetworkModule {
        let store = MemoryTokenStore::new();
        store.insert_json("beta", &token_record(false));
        store.insert_json("acme", &token_record(true));
        let config = NetworkConfig {
            prewarm_theme,
            ..NetworkConfig::default()
        };
        NetworkModule::with_source(config, Arc::new(store))
    }

    fn get_request(uri: &str, host: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn new_creates_module_without_binding() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(module.listener.is_none());
    }

    #[test]
    fn shutdown_controller_returns_shared_arc() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(Arc::ptr_eq(
            &module.shutdown_controller(),
            &module.shutdown_controller()
        ));
    }

    #[tokio::test]
    async fn theme_route_serves_default_tenant() {
        for prewarm in [false, true] {
            let router = module(prewarm).build_router();
            let response = router
                .oneshot(get_request("/api/theme", "example.com"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = json_body(response).await;
            assert_eq!(body["tenantId"], "beta");
            assert_eq!(body["tokens"], token_record(false));
            let css = body["css"].as_str().unwrap();
            assert_eq!(css.lines().filter(|l| l.starts_with("  --")).count(), 8);
            assert!(!css.contains("data-theme"));
        }
    }

    #[tokio::test]
    async fn stylesheet_route_serves_dark_block_for_acme() {
        let router = module(true).build_router();
        let response = router
            .oneshot(get_request("/theme.css", "shop.Acme.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let css = std::str::from_utf8(&bytes).unwrap();
        assert!(css.ends_with(
            ":root[data-theme=\"dark\"] {\n  --color-bg: #fff;\n  --color-text: #000;\n}"
        ));
    }

    #[tokio::test]
    async fn missing_tokens_fail_request_with_or_without_prewarm() {
        for prewarm in [false, true] {
            let store = MemoryTokenStore::new();
            store.insert_json("beta", &token_record(false));
            let config = NetworkConfig {
                prewarm_theme: prewarm,
                ..NetworkConfig::default()
            };
            let router = NetworkModule::with_source(config, Arc::new(store)).build_router();

            let response = router.oneshot(get_request("/api/theme", "acme.io")).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(json_body(response).await["error"], "missing_tenant_tokens");
        }
    }

    #[tokio::test]
    async fn loosely_typed_token_file_is_served_as_stored() {
        let raw = r##"{"space.4":"16px","dark.enabled":"yes","color.primary":"#111","color.primary-contrast":"#fff","color.bg":"#fff","color.text":"#000","radius.md":null,"font.family.sans":"sans-serif","space.2":8,"brand.logo":"logo.svg"}"##;
        let store = MemoryTokenStore::new();
        store.insert("beta", raw);
        let router =
            NetworkModule::with_source(NetworkConfig::default(), Arc::new(store)).build_router();

        let response = router
            .oneshot(get_request("/api/theme", "example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = std::str::from_utf8(&bytes).unwrap();
        assert!(body.contains(&format!("\"tokens\":{raw}")));

        let json: Value = serde_json::from_str(body).unwrap();
        let css = json["css"].as_str().unwrap();
        assert!(css.contains("  --space-2: 8;"));
        assert!(css.contains("  --radius-md: null;"));
        assert!(css.contains(":root[data-theme=\"dark\"]"));
    }

    #[tokio::test]
    async fn prewarm_does_not_gate_health_routes() {
        let router =
            NetworkModule::with_source(
                NetworkConfig {
                    prewarm_theme: true,
                    ..NetworkConfig::default()
                },
                Arc::new(MemoryTokenStore::new()),
            )
            .build_router();

        let response = router.oneshot(get_request("/health/live", "acme.io")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = module(false);
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let err = module(false)
            .serve(std::future::ready(()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn serve_stops_after_shutdown_signal() {
        let mut module = module(false);
        module.start().await.unwrap();
        let ctrl = module.shutdown_controller();

        module.serve(std::future::ready(())).await.unwrap();
        assert_eq!(ctrl.health_state(), HealthState::Stopped);
    }
}
