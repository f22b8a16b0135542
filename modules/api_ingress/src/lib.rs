//! HTTP host: owns the listener, the shared middleware stack and `/health`.
//! Feature modules hand their routers to [`ApiIngress::build_router`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Router produced by build_router, consumed by serve
    final_router: Mutex<Option<Router>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            final_router: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn set_config(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    /// Wrap `routes` with `/health`, the not-found fallback and the middleware stack,
    /// and keep the result for [`serve`](Self::serve).
    ///
    /// Request order (outermost → innermost):
    /// SetRequestId → PropagateRequestId → push_req_id_to_extensions → Trace → Timeout → CORS → BodyLimit
    pub fn build_router(&self, routes: Router) -> Router {
        let config = self.get_config();
        let x_request_id = request_id::header();

        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(web::route_not_found);

        // Each layer wraps the previous ones, so they are added innermost first.
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        *self.final_router.lock() = Some(router.clone());
        tracing::debug!(cors = config.cors_enabled, "HTTP router built");
        router
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let cfg = self.get_config();
        cfg.bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", cfg.bind_addr))
    }

    /// Bind and serve until `cancel` fires. `bound` receives the actual local
    /// address once the listener is up.
    pub async fn serve(
        self: Arc<Self>,
        cancel: CancellationToken,
        bound: Option<oneshot::Sender<SocketAddr>>,
    ) -> Result<()> {
        let addr = self.bind_addr()?;

        // Take the router so the guard is dropped before awaits
        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router built yet, serving health endpoint only");
                self.build_router(Router::new())
            }
        };

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let local = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", local);
        if let Some(tx) = bound {
            let _ = tx.send(local);
        }

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ApiIngressConfig::default();
        assert!(cfg.bind_addr.is_empty());
        assert!(cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.body_limit_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn config_is_swappable() {
        let ingress = ApiIngress::default();
        ingress.set_config(ApiIngressConfig {
            bind_addr: "127.0.0.1:0".into(),
            ..Default::default()
        });
        assert_eq!(ingress.bind_addr().unwrap().port(), 0);
    }

    #[test]
    fn invalid_bind_addr_is_reported() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: "not an address".into(),
            ..Default::default()
        });
        let err = ingress.bind_addr().unwrap_err();
        assert!(err.to_string().contains("not an address"));
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let cfg: ApiIngressConfig =
            serde_json::from_value(serde_json::json!({ "cors_enabled": false })).unwrap();
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
    }
}
