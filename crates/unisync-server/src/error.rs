use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use unisync_shared::protocol::ErrorBody;
use unisync_shared::types::ConversationId;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Conversation not found")]
    ConversationNotFound(ConversationId),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::Internal(e) => {
                tracing::error!(error = %e, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), axum::Json(ErrorBody::new(message))).into_response()
    }
}
