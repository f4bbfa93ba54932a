//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dynamic upstream handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{handlers::AppState, setup_admin_router};
use crate::config::DynamicConfig;
use crate::dynamic::DynamicUpstream;
use crate::http::request::{RequestUuid, X_REQUEST_ID};

/// HTTP front end of the dynamic upstream API.
pub struct AdminServer {
    router: Router,
}

impl AdminServer {
    pub fn new(config: &DynamicConfig, engine: DynamicUpstream) -> Self {
        let state = AppState {
            engine: Arc::new(engine),
            api_key: config.admin.api_key.as_deref().map(Arc::from),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DynamicConfig, state: AppState) -> Router {
        setup_admin_router(state, &config.admin.path)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
