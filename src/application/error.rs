use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::generator::GeneratorError, config::LoadError, infra::error::InfraError};

/// Diagnostic attached to failed responses and consumed by the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Plain-text HTTP failure for the HTML surface.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Top-level error surfaced by the binary's commands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
