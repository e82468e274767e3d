use super::recovery::Recovery;
use super::wire::*;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// RPC endpoints served by the backend. Every call goes through `recovery`,
/// so a panicking handler yields an `internal` reply instead of dropping the
/// connection.
pub fn routes(
    auth_service: Arc<dyn AuthService>,
    recovery: Arc<Recovery>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let login = warp::path!("auth.Auth" / "Login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and(with(recovery.clone()))
        .and_then(login);

    let signup = warp::path!("auth.Auth" / "Signup")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(auth_service))
        .and(with(recovery))
        .and_then(signup);

    let health = warp::path!("healthz")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "success": true })));

    login.or(signup).or(health).recover(recover_rpc_error)
}

async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    recovery: Arc<Recovery>,
) -> Result<impl Reply, Rejection> {
    let outcome = recovery
        .unary(LOGIN_METHOD, async move {
            let login_result = auth_service.login(body.into()).await?;
            Ok(LoginReply {
                token: login_result.token,
            })
        })
        .await;
    Ok(reply(outcome))
}

async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
    recovery: Arc<Recovery>,
) -> Result<impl Reply, Rejection> {
    let outcome = recovery
        .unary(SIGNUP_METHOD, async move {
            auth_service.signup(body.into()).await?;
            Ok(SignupReply {})
        })
        .await;
    Ok(reply(outcome))
}

fn reply<T: Serialize>(outcome: Result<T, AuthError>) -> warp::reply::Json {
    warp::reply::json(&RpcReply::from(outcome))
}

async fn recover_rpc_error(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, error) = if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        (
            StatusCode::OK,
            AuthError::InvalidArgument("invalid request body".into()),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            AuthError::Internal("method not allowed".into()),
        )
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            AuthError::Internal("unknown method".into()),
        )
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, AuthError::internal())
    };

    let json = warp::reply::json(&RpcReply::<()>::Error(error.into()));
    Ok(warp::reply::with_status(json, status))
}

fn with<T>(value: Arc<T>) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone
where
    T: Send + Sync + ?Sized,
{
    warp::any().map(move || value.clone())
}
