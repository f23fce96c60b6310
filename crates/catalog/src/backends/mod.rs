//! Executor implementations.
//!
//! | Executor | Backend | Description |
//! |----------|---------|-------------|
//! | [`MemoryExecutor`](memory::MemoryExecutor) | document store | Evaluates compiled filters over in-memory JSON, for tests and previews |
//!
//! Production executors wrap the MongoDB and Typesense clients and live with
//! the API service; with the `mongodb` feature enabled,
//! [`FindSpec::filter_document`](crate::query::FindSpec) hands them a driver
//! document.

pub mod memory;
