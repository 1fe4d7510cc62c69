//! Error types

use thiserror::Error;

/// Errors raised synchronously when a run is set up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RangeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The precondition message without the error-kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message) => message,
        }
    }
}

/// The first error produced by the iterator during a run
///
/// Carries the index whose invocation failed alongside the iterator's own error value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Iteration failed at index {index}: {error}")]
pub struct IterationFailure<E> {
    pub index: i64,
    #[source]
    pub error: E,
}

impl<E> IterationFailure<E> {
    pub fn new(index: i64, error: E) -> Self {
        Self { index, error }
    }

    /// Discard the index and keep the iterator's error
    pub fn into_inner(self) -> E {
        self.error
    }
}
