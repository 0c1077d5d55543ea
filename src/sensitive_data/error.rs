// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the masking pipeline

use thiserror::Error;

/// Result alias used across the masking pipeline.
pub type Result<T> = std::result::Result<T, MaskingError>;

/// Errors surfaced by `mask()`.
///
/// None of these are recovered internally: a failed invocation never
/// returns a partially masked document.
#[derive(Debug, Error)]
pub enum MaskingError {
    /// Caller supplied empty or whitespace-only text
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The classification capability failed or returned unusable output
    #[error("entity detection unavailable: {0}")]
    DetectionUnavailable(#[from] ClassifierError),

    /// Two detected spans claim overlapping byte ranges
    #[error("overlapping spans: {first:?} and {second:?}")]
    OverlapConflict {
        first: (usize, usize),
        second: (usize, usize),
    },

    /// A span points outside the source text or splits a character
    #[error("span {start}..{end} is not a valid range of a {len}-byte text")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    /// Configuration could not be compiled
    #[error("config error: {0}")]
    Config(String),
}

impl MaskingError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same input unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DetectionUnavailable(_))
    }
}

/// Failures of the external (or built-in) classification capability.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Backend could not be reached or refused the request
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// Reply did not match the expected findings shape
    #[error("malformed classifier output: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Reply used a label outside the entity taxonomy
    #[error("unknown entity category: {0}")]
    UnknownCategory(String),

    /// Reply reported a value that does not occur in the document
    #[error("finding for {category} does not occur in the document")]
    FindingNotInText { category: String },

    /// A candidate span does not address a valid range of the document
    #[error("candidate span {start}..{end} does not match the document")]
    InvalidSpan { start: usize, end: usize },
}

#[cfg(feature = "python")]
pyo3::create_exception!(
    sensitive_masking,
    InvalidInputError,
    pyo3::exceptions::PyValueError
);
#[cfg(feature = "python")]
pyo3::create_exception!(
    sensitive_masking,
    DetectionUnavailableError,
    pyo3::exceptions::PyRuntimeError
);
#[cfg(feature = "python")]
pyo3::create_exception!(
    sensitive_masking,
    OverlapConflictError,
    pyo3::exceptions::PyRuntimeError
);

#[cfg(feature = "python")]
impl From<MaskingError> for pyo3::PyErr {
    fn from(err: MaskingError) -> Self {
        let message = err.to_string();
        match err {
            MaskingError::InvalidInput { .. } => InvalidInputError::new_err(message),
            MaskingError::DetectionUnavailable(_) => DetectionUnavailableError::new_err(message),
            MaskingError::OverlapConflict { .. } | MaskingError::SpanOutOfBounds { .. } => {
                OverlapConflictError::new_err(message)
            }
            MaskingError::Config(_) => pyo3::exceptions::PyValueError::new_err(message),
        }
    }
}
