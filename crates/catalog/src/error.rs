//! Error types for the query layer.
//!
//! Query construction errors ([`QueryError`]) are kept apart from errors raised
//! by whatever executes the compiled queries ([`BackendError`]). Both roll up
//! into [`StorageError`].

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::query::BackendKind;

/// The primary error type returned by executors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Query composition errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns true if the error points at a mistake in pipeline composition
    /// rather than at bad caller input. The API layer reports these as 5xx.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, StorageError::Query(err) if err.is_configuration_error())
    }

    /// Returns true if a malformed parameter reached a filter.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StorageError::Query(QueryError::InvalidParameter { .. }))
    }
}

/// Errors raised while composing or compiling a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The backend variant cannot express the requested operation.
    #[error("operation '{operation}' is not supported by the {backend} backend")]
    UnsupportedOperation {
        operation: String,
        backend: BackendKind,
    },

    /// A filter parameter was malformed.
    #[error("invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A query references a field the search index does not declare (or
    /// declares with incompatible flags).
    #[error("schema mismatch in '{collection}' for field '{field}': {message}")]
    SchemaMismatch {
        collection: String,
        field: String,
        message: String,
    },
}

impl QueryError {
    /// Creates an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>, backend: BackendKind) -> Self {
        QueryError::UnsupportedOperation {
            operation: operation.into(),
            backend,
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(
        collection: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        QueryError::SchemaMismatch {
            collection: collection.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// See [`StorageError::is_configuration_error`].
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QueryError::UnsupportedOperation { .. } | QueryError::SchemaMismatch { .. }
        )
    }
}

/// Errors originating from the executing data-access layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The executor could not evaluate a compiled query.
    #[error("query execution failed: {message}")]
    QueryFailed { message: String },

    /// A compiled query could not be converted for the driver.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type for executor operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for query composition.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operation_display() {
        let err = QueryError::unsupported("filter_raw", BackendKind::SearchIndex);
        assert_eq!(
            err.to_string(),
            "operation 'filter_raw' is not supported by the search-index backend"
        );
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = QueryError::schema_mismatch("anime", "episodes", "field is not declared");
        assert!(err.to_string().contains("schema mismatch in 'anime'"));
    }

    #[test]
    fn test_configuration_error_classification() {
        let unsupported: StorageError =
            QueryError::unsupported("with_query_by", BackendKind::DocumentStore).into();
        assert!(unsupported.is_configuration_error());
        assert!(!unsupported.is_invalid_input());

        let invalid: StorageError = QueryError::invalid("start_date", "not a date").into();
        assert!(!invalid.is_configuration_error());
        assert!(invalid.is_invalid_input());

        let backend: StorageError = BackendError::QueryFailed {
            message: "timeout".to_string(),
        }
        .into();
        assert!(!backend.is_configuration_error());
        assert!(matches!(backend, StorageError::Backend(_)));
    }

    #[test]
    fn test_backend_errors_are_not_caller_mistakes() {
        for err in [
            BackendError::QueryFailed {
                message: "unsupported operator '$size'".to_string(),
            },
            BackendError::SerializationError {
                message: "filter is not a valid BSON document".to_string(),
            },
        ] {
            let display = err.to_string();
            let storage = StorageError::from(err.clone());
            assert!(!storage.is_configuration_error());
            assert!(!storage.is_invalid_input());
            assert!(storage.to_string().contains(&display));
        }
    }
}
