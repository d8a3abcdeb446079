//! ==============================================================================
//! error.rs - measurement error taxonomy
//! ==============================================================================
//!
//! purpose:
//!     every way a measurement request can fail. each variant is terminal for
//!     the request that raised it and never for the process.
//!
//! relationships:
//!     - raised by: timestamp.rs, domain.rs, api.rs
//!     - rendered by: the IntoResponse impl below (status code + json body)
//!
//! ==============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeasurementError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// identifier missing or not a valid date / date-time
    #[error("must provide timestamp in ISO format")]
    InvalidTimestamp,

    /// a field other than `timestamp` is not a float
    #[error("data must consist of floating point numbers only")]
    NonNumericField(String),

    /// path identifier and body identifier disagree
    #[error("mismatched timestamps in data")]
    TimestampMismatch,

    #[error("no stored data")]
    NotFound(String),
}

impl MeasurementError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidTimestamp | Self::NonNumericField(_) => StatusCode::BAD_REQUEST,
            Self::TimestampMismatch => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::NonNumericField(_) => "NON_NUMERIC_FIELD",
            Self::TimestampMismatch => "TIMESTAMP_MISMATCH",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}

/// json error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for MeasurementError {
    fn into_response(self) -> Response {
        match &self {
            Self::NonNumericField(field) => {
                tracing::debug!(field = %field, "rejected non-numeric field")
            }
            Self::NotFound(key) => tracing::debug!(key = %key, "no stored data"),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
