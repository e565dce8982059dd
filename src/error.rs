use thiserror::Error;

/// Every failure the helper can report.
#[derive(Debug, Error)]
pub enum HelperError {
    /// A required argument was absent or empty.
    #[error("Required parameter missing: {0}")]
    MissingParameter(&'static str),

    /// An argument was present but had the wrong shape.
    #[error("Parameter {parameter} expects {expected} but {actual}")]
    TypeMismatch {
        parameter: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A request named an operation the helper does not know.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The driver resolved a query without returning any result set.
    #[error("driver returned no result set")]
    EmptyResponse,

    /// Raised by the storage driver and passed through untouched.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

impl HelperError {
    pub fn type_mismatch(
        parameter: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            parameter: parameter.into(),
            expected,
            actual,
        }
    }

    /// True for errors raised before any driver call was attempted.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::TypeMismatch { .. } | Self::UnknownOperation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HelperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_keep_their_message() {
        let err = HelperError::from(anyhow::anyhow!("executeSql error"));
        assert_eq!(err.to_string(), "executeSql error");
        assert!(!err.is_parameter_error());
    }

    #[test]
    fn type_mismatch_states_expected_and_actual() {
        let err = HelperError::type_mismatch("tableName", "string", "object");
        assert_eq!(
            err.to_string(),
            "Parameter tableName expects string but object"
        );
        assert!(err.is_parameter_error());
    }
}
