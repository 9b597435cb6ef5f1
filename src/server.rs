use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::{AppState, SharedState, api_router};
use crate::db::{DbHandle, StoreDb};

pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub dev_mode: bool,
}

pub fn build_router(state: SharedState) -> Router {
    let mut router = api_router();
    if state.dev_mode {
        // The storefront dev server runs on another port.
        router = router.layer(CorsLayer::permissive());
    }
    router.with_state(state)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let db = StoreDb::new(&config.db_path)?;
    let state = Arc::new(AppState {
        db: DbHandle::new(db),
        jwt_secret: config.jwt_secret,
        dev_mode: config.dev_mode,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Store API listening on http://{addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let db = StoreDb::new_in_memory().unwrap();
        let state = Arc::new(AppState {
            db: DbHandle::new(db),
            jwt_secret: "test-secret".to_string(),
            dev_mode: true,
        });
        build_router(state)
    }

    #[test]
    fn test_server_config_carries_runtime_config() {
        let config = crate::config::Config {
            port: 9090,
            db_path: PathBuf::from("/tmp/glowstore-test/store.db"),
            jwt_secret: "secret".to_string(),
            dev_mode: true,
        };
        let server = ServerConfig {
            port: config.port,
            db_path: config.db_path,
            jwt_secret: config.jwt_secret,
            dev_mode: config.dev_mode,
        };
        assert_eq!(server.db_path, PathBuf::from("/tmp/glowstore-test/store.db"));
        assert_eq!(server.port, 9090);
    }

    #[tokio::test]
    async fn test_router_serves_health() {
        let resp = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_mounts_api_routes() {
        let resp = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
