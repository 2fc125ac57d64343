use crate::domain::model::{FormField, SelectionKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("{message}")]
    MissingRequiredField { field: FormField, message: String },

    #[error("{message}")]
    InvalidFormat { field: FormField, message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Catalog item registered twice: {key}")]
    DuplicateCatalogItem { key: SelectionKey },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserInput,
    Configuration,
    System,
}

impl QuoteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuoteError::MissingRequiredField { .. } | QuoteError::InvalidFormat { .. } => {
                ErrorCategory::UserInput
            }
            QuoteError::ConfigValidationError { .. }
            | QuoteError::InvalidConfigValueError { .. }
            | QuoteError::DuplicateCatalogItem { .. } => ErrorCategory::Configuration,
            QuoteError::IoError(_) | QuoteError::UrlError(_) | QuoteError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// The form field a user-input error points at, if any.
    pub fn field(&self) -> Option<FormField> {
        match self {
            QuoteError::MissingRequiredField { field, .. }
            | QuoteError::InvalidFormat { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            QuoteError::MissingRequiredField { message, .. }
            | QuoteError::InvalidFormat { message, .. } => message.clone(),
            QuoteError::ConfigValidationError { field, .. }
            | QuoteError::InvalidConfigValueError { field, .. } => {
                format!("The site configuration is invalid ({}).", field)
            }
            QuoteError::DuplicateCatalogItem { key } => {
                format!("The catalog lists {} more than once.", key)
            }
            QuoteError::IoError(_) => "Could not read the site configuration file.".to_string(),
            QuoteError::UrlError(_) => "The quote form address is not a valid URL.".to_string(),
            QuoteError::SerializationError(_) => "Could not render the quote summary.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::UserInput => "Correct the highlighted field and submit again",
            ErrorCategory::Configuration => "Check the site TOML file against the documented sections",
            ErrorCategory::System => "Check the file path and permissions, then retry",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
