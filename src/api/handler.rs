use super::error::*;
use crate::application_port::SessionToken;
use crate::domain_model::SignupMethod;
use crate::logger::*;
use crate::rpc::{AuthClient, LoginRequest, SignupRequest, secret_text};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    #[serde(deserialize_with = "secret_text::deserialize")]
    pub password: SecretString,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: SessionToken,
}

pub async fn login(
    body: LoginBody,
    auth_client: Arc<dyn AuthClient>,
    logger: Logger,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = LoginRequest {
        username: body.username,
        password: body.password,
    };
    let reply = logger
        .scope(auth_client.login(request))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let api_response = ApiResponse::ok(
        "login successful",
        Some(LoginResponse { token: reply.token }),
    );
    Ok(warp::reply::with_status(
        warp::reply::json(&api_response),
        StatusCode::OK,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub username: String,
    #[serde(deserialize_with = "secret_text::deserialize", default = "secret_text::empty")]
    pub password: SecretString,
    #[serde(deserialize_with = "secret_text::deserialize", default = "secret_text::empty")]
    pub code: SecretString,
    #[serde(rename = "type")]
    pub method: SignupMethod,
}

pub async fn signup(
    body: SignupBody,
    auth_client: Arc<dyn AuthClient>,
    logger: Logger,
) -> Result<impl warp::Reply, warp::Rejection> {
    let method = body.method;
    let request = SignupRequest {
        username: body.username,
        password: body.password,
        method,
        code: body.code,
    };
    logger
        .scope(auth_client.signup(request))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let message = match method {
        SignupMethod::Email => "user registered successfully",
        SignupMethod::Google => "user registered via google successfully",
    };
    let api_response = ApiResponse::<()>::ok(message, None);
    Ok(warp::reply::with_status(
        warp::reply::json(&api_response),
        StatusCode::CREATED,
    ))
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::<()> {
        success: true,
        message: None,
        data: None,
    }))
}
