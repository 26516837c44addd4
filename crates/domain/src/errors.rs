//! Domain Errors - Business rule violations
//!
//! Contains ONLY catalog rule errors, no infrastructure errors

use thiserror::Error;

/// Domain-specific errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Business validation: a required form field is blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Business rule: too many photos captured for one submission
    #[error("Too many photos: {count}, maximum allowed: {max_allowed}")]
    TooManyPhotos { count: usize, max_allowed: usize },

    /// Business validation: color outside the catalog palette
    #[error("Unknown part color: {0}")]
    UnknownColor(String),

    /// Business validation: model outside the supported vehicle list
    #[error("Unknown part model: {0}")]
    UnknownModel(String),

    /// Business validation: photo entry is neither a URL nor a data URL
    #[error("Invalid photo reference: {0}")]
    InvalidPhoto(String),

    /// Business validation: record not found
    #[error("Part not found with ID: {0}")]
    PartNotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Check if error is a business validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DomainError::MissingField(_)
                | DomainError::TooManyPhotos { .. }
                | DomainError::UnknownColor(_)
                | DomainError::UnknownModel(_)
                | DomainError::InvalidPhoto(_)
        )
    }

    /// Check if error indicates missing data
    pub fn is_not_found_error(&self) -> bool {
        matches!(self, DomainError::PartNotFound(_))
    }

    /// Get error category for business logic
    pub fn category(&self) -> ErrorCategory {
        if self.is_validation_error() {
            ErrorCategory::Validation
        } else if self.is_not_found_error() {
            ErrorCategory::NotFound
        } else {
            ErrorCategory::Other
        }
    }
}

/// Categories of domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input validation errors
    Validation,
    /// Resource not found
    NotFound,
    /// Other domain errors
    Other,
}
