use thiserror::Error;

/// A field-level rejection produced by the validation layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric or date field outside its allowed bounds.
    #[error("{field}: {message}")]
    OutOfRange { field: &'static str, message: String },

    /// String longer than the field allows.
    #[error("{field}: must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Value not in the field's declared set.
    #[error("{field}: '{value}' is not one of: {}", .allowed.join(", "))]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Required field absent on a create submission.
    #[error("{field}: field required")]
    MissingField { field: &'static str },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidEnum { field, .. }
            | ValidationError::MissingField { field } => field,
        }
    }

    pub(crate) fn out_of_range(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field,
            message: message.into(),
        }
    }
}

/// Application-wide error types for carshare.
#[derive(Error, Debug)]
pub enum AppError {
    /// Submission rejected by the validation layer.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Acting user may not mutate the resource.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No acting user could be resolved from the request credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Write would duplicate an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Returns true if the caller caused the failure and can fix the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::PermissionDenied(_)
                | AppError::NotFound(_)
                | AppError::Unauthorized(_)
                | AppError::Conflict(_)
        )
    }
}
