//! Theme endpoints: the JSON snapshot and the derived stylesheet.
//!
//! Both handlers read the per-request [`RequestThemeContext`] placed in the
//! request extensions by middleware. Stages already computed upstream are
//! reused; without a context the handler resolves the tenant itself.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use themekit_core::{RequestThemeContext, ThemeError, ThemeSnapshot};
use tracing::{error, warn};

use super::{request_host, AppState};

/// Error response for a failed token load.
///
/// An absent token set maps to 404; malformed or incomplete token data is a
/// tenant-configuration defect and maps to 500. No fallback theme is served.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ThemeRejection(#[from] pub ThemeError);

impl ThemeRejection {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ThemeError::MissingTenantTokens { .. } => StatusCode::NOT_FOUND,
            ThemeError::MalformedTokenData { .. } | ThemeError::MissingRequiredKey { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ThemeRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let tenant = self.0.tenant();
        if status.is_server_error() {
            error!(%tenant, kind = self.0.kind(), error = %self.0, "theme unavailable");
        } else {
            warn!(%tenant, kind = self.0.kind(), error = %self.0, "theme unavailable");
        }
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
            "tenantId": tenant,
        });
        (status, Json(body)).into_response()
    }
}

/// Takes the request's context (or a fresh one) and host out of the request.
fn request_context(req: &Request) -> (RequestThemeContext, Option<String>) {
    let ctx = req
        .extensions()
        .get::<RequestThemeContext>()
        .cloned()
        .unwrap_or_default();
    (ctx, request_host(req))
}

/// Runs the remaining pipeline stages for the request.
///
/// No borrow of the request may live across the storage read: its body is
/// not `Sync`.
async fn snapshot_for(state: &AppState, req: Request) -> Result<ThemeSnapshot, ThemeError> {
    let (mut ctx, host) = request_context(&req);
    drop(req);
    ctx.run(host.as_deref(), state.source.as_ref()).await
}

/// `GET /api/theme` -- returns `{ tenantId, tokens, css }` for the request's tenant.
///
/// # Errors
///
/// Returns a [`ThemeRejection`] when the tenant's tokens cannot be loaded.
pub async fn theme_handler(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ThemeSnapshot>, ThemeRejection> {
    Ok(Json(snapshot_for(&state, req).await?))
}

/// `GET /theme.css` -- serves the request's CSS variable block.
///
/// # Errors
///
/// Returns a [`ThemeRejection`] when the tenant's tokens cannot be loaded.
pub async fn stylesheet_handler(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ThemeRejection> {
    let snapshot = snapshot_for(&state, req).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        snapshot.css.to_string(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::token_record;
    use crate::network::{NetworkConfig, ShutdownController};
    use crate::storage::MemoryTokenStore;
    use axum::body::{to_bytes, Body};
    use std::sync::Arc;
    use std::time::Instant;
    use themekit_core::TenantId;

    fn test_state(store: MemoryTokenStore) -> AppState {
        AppState {
            source: Arc::new(store),
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(NetworkConfig::default()),
            start_time: Instant::now(),
        }
    }

    fn request(host: &str) -> Request {
        axum::http::Request::builder()
            .uri("/api/theme")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn theme_handler_without_context_resolves_from_host() {
        let store = MemoryTokenStore::new();
        store.insert_json("beta", &token_record(false));

        let Json(snapshot) = theme_handler(State(test_state(store)), request("example.com"))
            .await
            .unwrap();

        assert_eq!(snapshot.tenant_id.as_str(), "beta");
        assert!(snapshot.css.starts_with(":root {"));
    }

    #[tokio::test]
    async fn theme_handler_reuses_context_tenant() {
        let store = MemoryTokenStore::new();
        store.insert_json("beta", &token_record(false));
        let mut req = request("acme.example.com");
        req.extensions_mut()
            .insert(RequestThemeContext::with_tenant(TenantId::new("beta")));

        let Json(snapshot) = theme_handler(State(test_state(store)), req).await.unwrap();
        assert_eq!(snapshot.tenant_id.as_str(), "beta");
    }

    #[tokio::test]
    async fn stylesheet_handler_serves_css() {
        let store = MemoryTokenStore::new();
        store.insert_json("acme", &token_record(true));

        let response = stylesheet_handler(State(test_state(store)), request("ACME.io"))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let css = String::from_utf8(body.to_vec()).unwrap();
        assert!(css.contains(":root[data-theme=\"dark\"] {"));
    }

    #[tokio::test]
    async fn missing_tenant_maps_to_not_found() {
        let err = theme_handler(State(test_state(MemoryTokenStore::new())), request("acme.io"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let response = err.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "missing_tenant_tokens");
        assert_eq!(json["tenantId"], "acme");
    }

    #[tokio::test]
    async fn incomplete_tokens_map_to_server_error() {
        let store = MemoryTokenStore::new();
        let mut record = token_record(false);
        record.as_object_mut().unwrap().remove("radius.md");
        store.insert_json("beta", &record);

        let err = theme_handler(State(test_state(store)), request("example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.0.to_string().contains("radius.md"));
    }
}
