//! HTTP-facing errors and their mapping from domain errors.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::context;

use super::templates;
use crate::error::PhyslinkError;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// An error ready to be rendered as an HTML error page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large() -> Self {
        PhyslinkError::PayloadTooLarge {
            max_mb: super::MAX_UPLOAD_MB,
        }
        .into()
    }
}

impl From<PhyslinkError> for WebError {
    fn from(err: PhyslinkError) -> Self {
        let status = match &err {
            PhyslinkError::InvalidContentType(_)
            | PhyslinkError::InvalidNoteId(_)
            | PhyslinkError::Validation(_) => StatusCode::BAD_REQUEST,
            PhyslinkError::NoteNotFound(_) => StatusCode::NOT_FOUND,
            PhyslinkError::NoteExists(_) => StatusCode::CONFLICT,
            PhyslinkError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            // Full detail stays in the logs; clients get a generic message.
            tracing::error!(error = ?err, "request failed");
            return Self::new(status, INTERNAL_ERROR_MESSAGE);
        }

        tracing::debug!(%status, error = %err, "request rejected");
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for WebError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        tracing::debug!(error = %err, "malformed multipart body");
        Self::bad_request(err.body_text())
    }
}

impl From<FormRejection> for WebError {
    fn from(err: FormRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        tracing::debug!(error = %err, "malformed form body");
        Self::bad_request(err.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match templates::render("error.html", context! { error => &self.message }) {
            Ok(page) => (self.status, Html(page)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error page");
                (self.status, self.message).into_response()
            }
        }
    }
}
