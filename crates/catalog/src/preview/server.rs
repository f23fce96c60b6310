//! HTTP server for the query preview API.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Health check |
//! | `/collections/{entity}/schema` | GET | Search-index collection schema |
//! | `/queries/{entity}` | GET | Named queries for an entity |
//! | `/queries/{entity}/{name}` | GET | Compile a named query |
//! | `/listing/{entity}` | GET | Compile a listing request |

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use crate::config::CatalogConfig;

use super::handlers::PreviewState;

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Enable CORS.
    pub enable_cors: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            enable_cors: true,
        }
    }
}

impl PreviewConfig {
    /// Creates a configuration with the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Creates a configuration from `PREVIEW_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("PREVIEW_HOST").unwrap_or(defaults.host),
            port: std::env::var("PREVIEW_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: std::env::var("PREVIEW_ENABLE_CORS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.enable_cors),
        }
    }

    /// The socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// The query preview HTTP server.
pub struct PreviewServer {
    config: PreviewConfig,
    state: Arc<PreviewState>,
}

impl PreviewServer {
    /// Creates a server compiling queries for `catalog`.
    pub fn new(config: PreviewConfig, catalog: CatalogConfig) -> Self {
        Self {
            config,
            state: Arc::new(PreviewState::new(catalog)),
        }
    }

    /// Creates a server configured from the environment.
    pub fn from_env() -> Self {
        Self::new(PreviewConfig::from_env(), CatalogConfig::from_env())
    }

    /// The server configuration.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// The shared handler state.
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Runs the server until it fails.
    #[cfg(feature = "preview")]
    pub async fn run(&self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server until `shutdown_signal` resolves.
    #[cfg(feature = "preview")]
    pub async fn run_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        use tower_http::cors::{Any, CorsLayer};
        use tracing::info;

        let app = self.create_router();
        let app = if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            app
        };

        let addr = self
            .config
            .socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        info!("Starting query preview server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
    }

    #[cfg(feature = "preview")]
    fn create_router(&self) -> axum::Router {
        use axum::{Router, routing::get};

        Router::new()
            .route("/health", get(routes::health))
            .route("/collections/{entity}/schema", get(routes::schema))
            .route("/queries/{entity}", get(routes::query_names))
            .route("/queries/{entity}/{name}", get(routes::query))
            .route("/listing/{entity}", get(routes::listing))
            .with_state(Arc::clone(&self.state))
    }
}

#[cfg(feature = "preview")]
mod routes {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::Json;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde::Serialize;
    use serde_json::json;

    use crate::preview::handlers::{
        HandlerError, PreviewState, QueryRequest, handle_listing, handle_query,
        handle_query_names, handle_schema,
    };

    type SharedState = State<Arc<PreviewState>>;

    fn respond<T: Serialize>(result: Result<T, HandlerError>) -> Response {
        match result {
            Ok(body) => match serde_json::to_value(body) {
                Ok(value) => (StatusCode::OK, Json(value)).into_response(),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response(),
            },
            Err(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(err.to_json())).into_response()
            }
        }
    }

    pub(super) async fn health() -> impl IntoResponse {
        Json(json!({
            "status": "healthy",
            "service": "query-preview",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }

    pub(super) async fn schema(
        State(state): SharedState,
        Path(entity): Path<String>,
    ) -> Response {
        respond(handle_schema(&state, &entity))
    }

    pub(super) async fn query_names(Path(entity): Path<String>) -> Response {
        respond(handle_query_names(&entity))
    }

    pub(super) async fn query(
        State(state): SharedState,
        Path((entity, name)): Path<(String, String)>,
        Query(request): Query<QueryRequest>,
    ) -> Response {
        respond(handle_query(&state, &entity, &name, &request))
    }

    pub(super) async fn listing(
        State(state): SharedState,
        Path(entity): Path<String>,
        Query(params): Query<BTreeMap<String, String>>,
    ) -> Response {
        respond(handle_listing(&state, &entity, params.into()))
    }
}
