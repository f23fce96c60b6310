//! Core execution seam.
//!
//! The query layer stops at compiled queries. Running them belongs to a
//! [`QueryExecutor`], which the API layer supplies (a MongoDB or Typesense
//! client) and tests replace with the
//! [`MemoryExecutor`](crate::backends::memory::MemoryExecutor).
//!
//! # Example
//!
//! ```ignore
//! use catalog_query::core::QueryExecutor;
//! use catalog_query::repository::{AnimeRepository, DefaultAnimeRepository};
//! use catalog_query::types::Pagination;
//!
//! async fn airing<E: QueryExecutor>(
//!     executor: &E,
//!     repo: &DefaultAnimeRepository,
//! ) -> catalog_query::error::StorageResult<()> {
//!     let page = executor
//!         .execute(&repo.top_airing_items(), &Pagination::first(25))
//!         .await?;
//!     println!("{} entries", page.pagination.items.total);
//!     Ok(())
//! }
//! ```

mod executor;

pub use executor::QueryExecutor;
