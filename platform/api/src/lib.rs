use async_graphql::{Error, ErrorExtensions};
use thiserror::Error;

/// Shared API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Client-facing failures. Every variant is caused by the submitted payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("bad request: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::MissingField(field) => Some(field),
            ApiError::InvalidInput(_) => None,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        tracing::debug!(code = self.code(), error = %self, "rejecting request");
        Error::new(self.to_string()).extend_with(|_err, e| {
            e.set("code", self.code());
            e.set("type", "BAD_REQUEST");
            if let Some(field) = self.field() {
                e.set("field", field);
            }
        })
    }
}
