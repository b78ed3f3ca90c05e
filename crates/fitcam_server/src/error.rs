//! Error type for the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fitcam_core::FitcamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Session(#[from] FitcamError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Session(e) => match e {
                FitcamError::Config(_) | FitcamError::InvalidWorkout(_) => StatusCode::BAD_REQUEST,
                FitcamError::InvalidState { .. }
                | FitcamError::SaveInProgress
                | FitcamError::AlreadySaved => StatusCode::CONFLICT,
                FitcamError::ActorClosed => StatusCode::SERVICE_UNAVAILABLE,
                FitcamError::Storage(_)
                | FitcamError::Status { .. }
                | FitcamError::Http(_)
                | FitcamError::Io(_)
                | FitcamError::Serialization(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for handlers.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fitcam_core::SessionState;

    #[test]
    fn maps_session_errors_to_status_codes() {
        let conflict = ServerError::from(FitcamError::InvalidState {
            action: "save",
            state: SessionState::Active,
        });
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ServerError::from(FitcamError::ActorClosed).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServerError::from(FitcamError::Storage("gone".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServerError::Validation("bad date".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
