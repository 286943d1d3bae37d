use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::use_cases::IngestError;

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Errors go back as plain text carrying the message.
impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
