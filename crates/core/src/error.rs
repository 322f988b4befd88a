// Error taxonomy for the invocation pathway

use crate::schema::ValidationError;

/// Registration-time failure. Never reaches the invocation pathway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// First registration wins; later registrations under the same name are
    /// rejected rather than silently shadowing.
    #[error("operation already registered: {0}")]
    Duplicate(String),
}

/// Everything that can go wrong for a single invocation.
///
/// All variants are converted to error envelopes at the executor (or, for
/// `ConnectionLost`, at the session boundary); callers above those layers
/// never see this type raw.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvokeError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Handler(String),

    #[error("connection lost before a result was delivered")]
    ConnectionLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_passes_through() {
        let err = InvokeError::Validation(ValidationError::MissingParameter {
            name: "values".to_string(),
        });
        assert_eq!(err.to_string(), "missing required parameter: values");
    }

    #[test]
    fn test_unknown_operation_names_the_operation() {
        let err = InvokeError::UnknownOperation("frobnicate".to_string());
        assert_eq!(err.to_string(), "unknown operation: frobnicate");
    }
}
