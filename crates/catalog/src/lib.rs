//! Query layer for the anime and manga catalog.
//!
//! Catalog entries live in two places: a document store holding the full
//! records, and a search index holding a flattened, typo-tolerant copy. This
//! crate builds queries for both from one set of filters and named pipelines.
//!
//! # Architecture
//!
//! - [`query`] - the [`QueryTarget`](query::QueryTarget) sum type, the shared
//!   [`QueryOps`](query::QueryOps) builder trait and both compilers
//! - [`filters`] - reusable filters, orderings and the listing
//!   [`FilterRegistry`](filters::FilterRegistry)
//! - [`repository`] - per-entity repositories exposing named queries
//! - [`schema`] - search-index declarations and the document transform
//! - [`model`] - stored records and their label vocabularies
//! - [`core`] / [`backends`] - the executor seam and an in-memory executor
//! - [`preview`] - an HTTP API that returns compiled queries
//!
//! # Features
//!
//! - `mongodb` - converts compiled filters into driver documents
//! - `preview` - builds the `query-preview` server binary
//!
//! # Quick Start
//!
//! ```
//! use catalog_query::config::CatalogConfig;
//! use catalog_query::query::CompiledQuery;
//! use catalog_query::repository::{AnimeRepository, DefaultAnimeRepository};
//!
//! let repo = DefaultAnimeRepository::from_config(&CatalogConfig::default());
//! let CompiledQuery::Find(spec) = repo.top_airing_items().build().unwrap() else {
//!     unreachable!();
//! };
//! assert_eq!(spec.collection, "anime");
//! assert_eq!(spec.sort[0].field, "rank");
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod filters;
pub mod model;
pub mod preview;
pub mod query;
pub mod repository;
pub mod schema;
pub mod types;

pub use error::{QueryError, QueryResult, StorageError, StorageResult};
pub use query::{BackendKind, CompiledQuery, QueryOps, QueryTarget};
