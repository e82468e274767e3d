use crate::api;
use crate::logger::*;
use crate::rpc::{AuthClient, HttpAuthClient};
use crate::settings::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warp::Filter;

pub async fn run_gateway(
    settings: &Settings,
    logger: Logger,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let address: SocketAddr = settings.gateway.address.parse()?;
    let timeout = Duration::from_secs(settings.gateway.request_timeout_secs);
    let auth_client: Arc<dyn AuthClient> =
        Arc::new(HttpAuthClient::new(&settings.gateway.backend_url, timeout)?);

    let recover_logger = logger.clone();
    let routes = api::routes(auth_client, logger)
        .recover(move |err| api::recover_error(err, recover_logger.clone()));

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(address, async move { shutdown.cancelled().await })?;
    info!(%bound, backend = %settings.gateway.backend_url, "gateway listening");
    server.await;

    info!("gateway stopped");
    Ok(())
}
