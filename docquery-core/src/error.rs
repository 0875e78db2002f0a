//! Error and result types for the query engine.
//!
//! The engine distinguishes exactly two failure classes: client input that
//! could not be normalized ([`QueryEngineError::MalformedParameter`]) and
//! failures reported by the underlying document store
//! ([`QueryEngineError::Store`]). Neither is retried at this layer, and no
//! failure is ever folded into a partial result.

use thiserror::Error;

/// Represents all errors that can occur while normalizing and executing a
/// collection read.
#[derive(Error, Debug)]
pub enum QueryEngineError {
    /// A request parameter's shape could not be normalized: an unparseable
    /// string, a wrong type, or a negative limit. The first argument names
    /// the offending field. Surfaced to the caller as a client-input error.
    #[error("malformed parameter `{0}`: {1}")]
    MalformedParameter(String, String),
    /// The underlying document store rejected or failed a query, including
    /// population directives that reference an unknown relation.
    #[error("store error: {0}")]
    Store(String),
}

/// A specialized `Result` type for query engine operations.
pub type QueryEngineResult<T> = Result<T, QueryEngineError>;

impl QueryEngineError {
    /// Creates a [`QueryEngineError::MalformedParameter`] naming the field.
    pub fn malformed(field: impl Into<String>, reason: impl ToString) -> Self {
        QueryEngineError::MalformedParameter(field.into(), reason.to_string())
    }

    /// Creates a [`QueryEngineError::Store`].
    pub fn store(message: impl ToString) -> Self {
        QueryEngineError::Store(message.to_string())
    }

    /// Returns true when the error should map to a client-input response
    /// rather than a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryEngineError::MalformedParameter(..))
    }
}
