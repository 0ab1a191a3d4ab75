/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
///
/// Only the cases that cannot be recovered by substitution surface here.
/// Missing tax profiles, failed quotations and clamped credits are reported
/// through `CalculationFlags` on the result instead.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for request input (line items, amounts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (rates, rule ordering, environment)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No freight bracket can be selected for the shipment
    #[error("No applicable freight bracket: {0}")]
    NoApplicableBracket(String),

    /// A collaborator failed and no substitution exists
    #[error("Provider error: {0}")]
    Provider(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML rule file parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File and stream errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn no_bracket(msg: impl Into<String>) -> Self {
        AppError::NoApplicableBracket(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        AppError::Provider(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Arithmetic on request amounts left the supported range
    pub fn overflow(what: impl std::fmt::Display) -> Self {
        AppError::Validation(format!("amount overflow: {} is out of range", what))
    }

    /// True for the errors that must abort a calculation because the setup
    /// itself is wrong, as opposed to bad request input.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_) | AppError::NoApplicableBracket(_)
        )
    }
}
