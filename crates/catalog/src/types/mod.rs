//! Core types shared by the query backends.
//!
//! - [`Field`] and [`fields`] - field references with their store path and index name
//! - [`FieldValue`] - typed literals rendered per backend
//! - [`Pagination`], [`Page`] - page requests and result pages
//! - [`SearchOptions`] - options for the search-index query factory

mod field;
mod pagination;
mod search_options;
mod value;

pub use field::{Field, fields};
pub use pagination::{Page, PageInfo, PageItems, Pagination};
pub use search_options::SearchOptions;
pub use value::{FieldValue, to_atom_string};
