use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deskio_core::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Desk(#[from] deskio_core::Error),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        use deskio_core::Error;
        match self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Desk(Error::MissingField(_) | Error::InvalidField { .. }) => StatusCode::BAD_REQUEST,
            AppError::Desk(Error::SequenceExhausted(_)) => StatusCode::CONFLICT,
            AppError::Desk(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log_error!("{}", self);
        } else {
            log_debug!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
