//! HTTP server initialization.
//!
//! [`serve_http`] opens the storage handle once, wraps it in the shared
//! handler state, and serves the diary router with request tracing and CORS
//! until ctrl-c.

use crate::config::{DiaryConfig, ServerConfig};
use crate::db;
use crate::routes::{self, AppState, DiaryZone};
use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::Local;
use std::sync::{Arc, Mutex};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Start the diary HTTP API.
pub async fn serve_http(config: DiaryConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let state = AppState::new(Arc::new(Mutex::new(conn)), Local);
    let app = build_app(state, &config.server)?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "diary API listening at http://{bind_addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}

/// The diary router with tracing and (when origins are configured) CORS layers.
pub fn build_app<Tz: DiaryZone>(state: AppState<Tz>, server: &ServerConfig) -> Result<Router> {
    let mut app = routes::router(state).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&server.allowed_origins)? {
        app = app.layer(cors);
    }
    Ok(app)
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers([header::CONTENT_LENGTH])
            .allow_credentials(true),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::FixedOffset;
    use tower::ServiceExt;

    fn test_state() -> AppState<FixedOffset> {
        let conn = db::open_memory_database().unwrap();
        AppState::new(Arc::new(Mutex::new(conn)), FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn empty_origin_list_disables_cors() {
        assert!(cors_layer(&[]).unwrap().is_none());
    }

    #[test]
    fn unparseable_origin_is_rejected() {
        let err = cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid CORS origin"));
    }

    #[tokio::test]
    async fn preflight_allows_configured_origin() {
        let app = build_app(test_state(), &ServerConfig::default()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/diary/time")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
        assert_eq!(response.headers()["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn other_origins_get_no_cors_headers() {
        let app = build_app(test_state(), &ServerConfig::default()).unwrap();

        let response = app
            .oneshot(
                Request::get("/api/health")
                    .header("origin", "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }
}
