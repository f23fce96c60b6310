//! Query preview server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default settings
//! query-preview
//!
//! # Preview against prefixed collections on another port
//! CATALOG_COLLECTION_PREFIX=staging_ PREVIEW_PORT=9000 query-preview
//! ```
//!
//! # Environment Variables
//!
//! - `PREVIEW_HOST` - Host to bind to (default: 127.0.0.1)
//! - `PREVIEW_PORT` - Port to bind to (default: 8081)
//! - `PREVIEW_ENABLE_CORS` - Enable CORS (default: true)
//! - `CATALOG_*` - Catalog configuration, see `CatalogConfig::from_env`

use catalog_query::config::CatalogConfig;
use catalog_query::preview::{PreviewConfig, PreviewServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_query=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = CatalogConfig::from_env();
    if let Err(errors) = catalog.validate() {
        for error in &errors {
            tracing::error!("invalid catalog configuration: {}", error);
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    let config = PreviewConfig::from_env();
    tracing::info!("Query preview starting on {}:{}", config.host, config.port);

    println!("\nAvailable endpoints:");
    println!("  GET  /health                          - Health check");
    println!("  GET  /collections/{{entity}}/schema     - Search-index schema");
    println!("  GET  /queries/{{entity}}                - Named queries");
    println!("  GET  /queries/{{entity}}/{{name}}         - Compile a named query");
    println!("  GET  /listing/{{entity}}                - Compile a listing request");
    println!();

    let server = PreviewServer::new(config, catalog);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received, stopping server...");
    };

    server.run_with_shutdown(shutdown_signal).await?;

    tracing::info!("Server stopped");
    Ok(())
}
