use super::handler;
use crate::logger::Logger;
use crate::rpc::AuthClient;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    auth_client: Arc<dyn AuthClient>,
    logger: Logger,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // path before method, so a GET on /login is a 405 and not a 404
    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(auth_client.clone()))
        .and(with_logger(logger.clone()))
        .and_then(handler::login);

    let signup = warp::path("signup")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(auth_client))
        .and(with_logger(logger))
        .and_then(handler::signup);

    let health = warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handler::health);

    login.or(signup).or(health)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_logger(logger: Logger) -> impl Filter<Extract = (Logger,), Error = Infallible> + Clone {
    warp::any().map(move || logger.clone())
}
