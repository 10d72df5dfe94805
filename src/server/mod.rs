//! HTTP front end

mod error;
mod handlers;
mod params;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use kubepeek_k8s::{ClusterClientFactory, EnvSource};
use kubepeek_report::Renderer;

use crate::config::{ServerIdentity, ServerSettings};

/// Read-only state shared by every request
pub struct AppState {
    pub settings: ServerSettings,
    pub identity: ServerIdentity,
    /// Source of the cluster endpoint variables, read per request
    pub env: Arc<dyn EnvSource>,
    pub clients: Arc<dyn ClusterClientFactory>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(
        settings: ServerSettings,
        identity: ServerIdentity,
        env: Arc<dyn EnvSource>,
        clients: Arc<dyn ClusterClientFactory>,
    ) -> Self {
        let renderer = Renderer::new(settings.template.clone());
        Self {
            settings,
            identity,
            env,
            clients,
            renderer,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::report_page).post(handlers::report_page),
        )
        .route(
            "/query",
            get(handlers::report_raw).post(handlers::report_raw),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = state.settings.listen_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    info!("Listening on {} ...", state.settings.bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down");
}
