//! Unified error handling for the HTTP layer.
//!
//! Every failure is answered with the same `{data: null, logs: [...]}`
//! envelope as a success, so the admin screens can show accumulated
//! warnings next to the error that stopped the request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::export::ExportError;
use crate::iiko::IikoError;
use crate::import::ImportError;
use crate::logs::{Envelope, Logs};
use crate::store::StoreError;

const LOG_SOURCE: &str = "request";

/// Application-level error type for the connector.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request parameter.
    #[error("{0}")]
    Validation(String),

    /// iiko answered, but without the data the request needs.
    #[error("{0}")]
    EmptyResponse(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Iiko(#[from] IikoError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Attach the logs collected before the failure.
    #[must_use]
    pub fn with_logs(self, logs: Logs) -> LoggedError {
        LoggedError { error: self, logs }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EmptyResponse(_) | Self::Iiko(_) => StatusCode::BAD_GATEWAY,
            Self::Import(ImportError::Store(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Export(error) => match error {
                ExportError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                ExportError::Iiko(_) => StatusCode::BAD_GATEWAY,
                ExportError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ExportError::MissingPosOrderId(_)
                | ExportError::NoOrganization
                | ExportError::NoTerminalGroup
                | ExportError::NoItems(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Import(ImportError::Store(_))
                | Self::Export(ExportError::Store(_))
        )
    }

    /// Message shown to the client. Internal details stay in Sentry.
    fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.with_logs(Logs::new()).into_response()
    }
}

/// An [`AppError`] together with the logs of the failed request.
#[derive(Debug)]
pub struct LoggedError {
    error: AppError,
    logs: Logs,
}

impl LoggedError {
    #[must_use]
    pub const fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for LoggedError {
    fn from(error: AppError) -> Self {
        error.with_logs(Logs::new())
    }
}

impl IntoResponse for LoggedError {
    fn into_response(self) -> Response {
        let Self { error, mut logs } = self;
        let status = error.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&error);
            tracing::error!(
                error = %error,
                sentry_event_id = %event_id,
                "Connector request error"
            );
        }

        logs.error(LOG_SOURCE, error.public_message());
        (status, Json(Envelope::<()>::failed(logs))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iiko_connector_core::OrderId;

    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation("Organization ID is required.".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::EmptyResponse("Response does not contain organizations.".to_string())
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Import(ImportError::NoImportedGroups).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Export(ExportError::OrderNotFound(OrderId::new(7))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Export(ExportError::NoItems(OrderId::new(7))).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Iiko(IikoError::RateLimited(60)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Store(StoreError::NotFound("order 1".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Store(StoreError::DataCorruption("bad kind".to_string()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Export(ExportError::MissingPosOrderId(OrderId::new(12)));
        assert_eq!(err.public_message(), "Order 12 doesn't have iiko ID.");
    }

    #[tokio::test]
    async fn test_failed_envelope_keeps_earlier_logs() {
        let mut logs = Logs::new();
        logs.warning("import", "Group G9 is not in the cached nomenclature.");

        let response = AppError::Import(ImportError::NoImportedGroups)
            .with_logs(logs)
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["logs"].as_array().unwrap().len(), 2);
        assert_eq!(json["logs"][1]["level"], "error");
        assert_eq!(json["logs"][1]["message"], "No imported groups.");
    }
}
