//! Filter library tests, executed against the in-memory executor.

pub mod content_tests;
pub mod date_tests;
pub mod ordering_tests;
pub mod relation_tests;
pub mod parity_tests;
