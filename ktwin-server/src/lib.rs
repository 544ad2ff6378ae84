// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! KTwin graph server
//!
//! Serves the current Instance graph to deployed twin services and accepts
//! inventory replacements from the reconcile loop.

pub mod api;
pub mod config;

use anyhow::{Context, Result};
use axum::{
    routing::{get, put},
    Router,
};
use config::ServerConfig;
use ktwin_core::TwinInstance;
use ktwin_graph::TwinGraphServer;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{ApiError, AppState};

/// Read a JSON array of TwinInstance resources
pub fn load_inventory(path: &Path) -> Result<Vec<TwinInstance>> {
    let content = std::fs::read(path)
        .with_context(|| format!("reading instance inventory {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("parsing instance inventory {}", path.display()))
}

/// Build the HTTP router
pub fn app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(api::health_check))
        .route(&config.graph.route, get(api::twin_graph))
        .route("/api/v1/instances", put(api::replace_instances))
        .fallback(|| async { ApiError::NotFound("No such endpoint".to_string()) })
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ktwin_server=info,ktwin_graph=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KTwin Graph Server");
    tracing::info!("Configuration: {:#?}", config);

    config.validate()?;

    let graph = Arc::new(TwinGraphServer::new());
    if let Some(path) = &config.graph.inventory_path {
        let instances = load_inventory(path)?;
        tracing::info!("Loaded {} instances from {:?}", instances.len(), path);
        graph.rebuild(&instances);
    }

    let app = app_router(AppState::new(graph), &config);

    let addr = config.socket_addr()?;
    tracing::info!("Twin graph served on http://{}{}", addr, config.graph.route);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }
}
