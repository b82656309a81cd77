use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("malformed report: {message}")]
    MalformedReport { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn malformed_report(message: impl Into<String>) -> Self {
        Self::MalformedReport {
            message: message.into(),
        }
    }
}
