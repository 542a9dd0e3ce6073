//! Error handling.

use axum::{
    extract::rejection::QueryRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

use crate::models::Dataset;

/// Analytics server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Error reading a dataset file
    #[error("failed to read {dataset} dataset")]
    DatasetRead {
        dataset: Dataset,
        #[source]
        source: std::io::Error,
    },

    /// Dataset file is not a JSON array of the expected records
    #[error("failed to parse {dataset} dataset")]
    DatasetFormat {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },

    /// Record date that does not start with a valid `YYYY-MM-DD` date
    #[error("invalid record date '{date}'")]
    InvalidDate { date: String },

    /// Unsupported interval requested
    #[error("Invalid interval")]
    InvalidInterval,

    /// Error deserialising query parameters
    #[error("query parameters are not valid")]
    QueryRejection(#[from] QueryRejection),
}

impl IntoResponse for AnalyticsError {
    /// Convert from an `AnalyticsError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Debug, Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    error: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            causes.push(source.to_string());
            current = source.source();
        }
        // Remove duplicate entries.
        causes.dedup();
        ErrorBody {
            error: error.to_string(),
            caused_by: (!causes.is_empty()).then_some(causes),
        }
    }
}

/// A response to send in error cases
struct ErrorResponse {
    /// HTTP status of the response
    status: StatusCode,

    /// Response body
    body: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            body: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<AnalyticsError> for ErrorResponse {
    /// Convert from an `AnalyticsError` into an `ErrorResponse`.
    fn from(error: AnalyticsError) -> Self {
        let response = match &error {
            // Bad request
            AnalyticsError::InvalidInterval | AnalyticsError::QueryRejection(_) => {
                Self::bad_request(&error)
            }

            // Internal server error
            AnalyticsError::DatasetRead { .. }
            | AnalyticsError::DatasetFormat { .. }
            | AnalyticsError::InvalidDate { .. } => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string(&self.body);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
