use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use savetrack_ai::ChatError;
use savetrack_core::errors::Error as CoreError;
use savetrack_core::goals::GoalError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Chat(#[from] ChatError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Goal(GoalError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
                CoreError::Goal(GoalError::NotFound(_)) => StatusCode::NOT_FOUND,
                CoreError::Goal(GoalError::DuplicateName(_))
                | CoreError::Goal(GoalError::AlreadyComplete(_))
                | CoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Chat(e) => match e {
                ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ChatError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ChatError::BlockedContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ChatError::EmptyResponse => StatusCode::BAD_GATEWAY,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Persistence details stay in the log.
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<GoalError> for ApiError {
    fn from(err: GoalError) -> Self {
        ApiError::Core(CoreError::Goal(err))
    }
}
