//! Query preview API.
//!
//! Compiles repository queries and listing requests and returns them as JSON
//! without executing anything, so pipelines can be inspected against either
//! backend. The HTTP server needs the `preview` feature; the handlers do not.
//!
//! # Example
//!
//! ```ignore
//! use catalog_query::config::CatalogConfig;
//! use catalog_query::preview::{PreviewConfig, PreviewServer};
//!
//! let server = PreviewServer::new(PreviewConfig::default(), CatalogConfig::default());
//! server.run().await?;
//! ```

pub mod handlers;
pub mod server;

pub use handlers::{
    HandlerError, ListingResponse, PreviewState, QueryRequest, QueryResponse, handle_listing,
    handle_query, handle_query_names, handle_schema,
};
pub use server::{PreviewConfig, PreviewServer};
