use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinPlanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid tax regime '{regime}': {reason}")]
    InvalidRegime { regime: String, reason: String },

    #[error("Precision limit exceeded in {context}")]
    PrecisionLimit { context: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinPlanError {
    fn from(e: serde_json::Error) -> Self {
        FinPlanError::SerializationError(e.to_string())
    }
}

impl FinPlanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinPlanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
