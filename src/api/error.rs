use crate::api::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use std::convert::Infallible;
use thiserror::Error;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// Runs on warp's connection tasks, outside any request scope, so events go
/// through `logger` explicitly.
pub async fn recover_error(
    err: Rejection,
    logger: Logger,
) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if let Some(err) = err.find::<ApiErrorCode>() {
        (err.status(), err.to_string())
    } else if err.find::<BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
    {
        (StatusCode::BAD_REQUEST, "invalid request body".to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else {
        logger.in_scope(|| warn!("Unhandled rejection: {:?}", err));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR.to_string(),
        )
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(message));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiErrorCode {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    UsernameTaken(String),
    #[error("internal server error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UsernameTaken(_) => StatusCode::CONFLICT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidArgument(message) => ApiErrorCode::BadRequest(message),
            AuthError::Unauthenticated(message) => ApiErrorCode::InvalidCredentials(message),
            AuthError::AlreadyExists(message) => ApiErrorCode::UsernameTaken(message),
            AuthError::Internal(_) => ApiErrorCode::InternalError,
        }
    }
}
