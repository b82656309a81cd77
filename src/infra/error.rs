use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("push transport error: {message}")]
    Push { message: String },
}

impl InfraError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn push(message: impl Into<String>) -> Self {
        Self::Push {
            message: message.into(),
        }
    }
}
