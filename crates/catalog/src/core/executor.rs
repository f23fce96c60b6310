//! Executor trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::query::{BackendKind, QueryTarget};
use crate::types::{Page, Pagination};

/// Runs compiled query targets against a backend.
///
/// Implementations compile the target themselves (`build_paged` for
/// [`execute`](Self::execute), `build` for [`count`](Self::count)), so a
/// composition error surfaces as [`StorageError::Query`](crate::error::StorageError::Query)
/// before anything is sent. An empty result is an empty page, never an error.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Human-readable executor name, used in logs.
    fn executor_name(&self) -> &'static str;

    /// Whether the executor can run targets of the given backend.
    fn supports(&self, backend: BackendKind) -> bool;

    /// Runs the target and returns one page of raw documents.
    ///
    /// # Errors
    ///
    /// * `StorageError::Query` - if the target does not compile, or addresses
    ///   a backend this executor does not support
    /// * `StorageError::Backend` - if the backend fails
    async fn execute(
        &self,
        target: &QueryTarget,
        pagination: &Pagination,
    ) -> StorageResult<Page<Value>>;

    /// Counts every document the target matches.
    async fn count(&self, target: &QueryTarget) -> StorageResult<u64>;
}
