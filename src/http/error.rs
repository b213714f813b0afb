use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::application::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is missing fields or has the wrong shape.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    /// Map a JSON extraction failure onto the endpoint's bad-request message.
    pub fn from_rejection(rejection: JsonRejection, message: &'static str) -> Self {
        debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest(message)
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Ledger(LedgerError::InsufficientFunds { .. }) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
