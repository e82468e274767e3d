use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_postgres::*;
use crate::logger::*;
use crate::rpc::{self, Recovery};
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Credential backend: the auth service behind the recovery wrapper.
pub struct Backend {
    pub auth_service: Arc<dyn AuthService>,
    pub recovery: Arc<Recovery>,
    pool: Option<PgPool>,
}

impl Backend {
    pub async fn try_new(settings: &Settings, logger: Logger) -> anyhow::Result<Self> {
        let (tx_manager, pool): (Arc<dyn TxManager>, Option<PgPool>) =
            match settings.store.backend.as_str() {
                "memory" => (Arc::new(MemoryUserStore::new()), None),
                "postgres" => {
                    let pool = PgPoolOptions::new()
                        .max_connections(settings.store.max_connections)
                        .connect(&settings.store.database_url)
                        .await?;
                    (Arc::new(PgTxManager::new(pool.clone())), Some(pool))
                }
                other => return Err(anyhow!("Unknown store backend: {}", other)),
            };

        let credential_hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2PasswordHasher::new().map_err(|e| anyhow!(e))?);
        let token_issuer: Arc<dyn TokenIssuer> = Arc::new(RandomTokenIssuer::new());

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            tx_manager,
            credential_hasher,
            token_issuer,
            logger.clone(),
        ));

        info!(store = %settings.store.backend, "backend ready");

        Ok(Self {
            auth_service,
            recovery: Arc::new(Recovery::new(logger)),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("backend shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

pub async fn run_backend(
    settings: &Settings,
    logger: Logger,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let address: SocketAddr = settings.backend.address.parse()?;
    let backend = Backend::try_new(settings, logger).await?;

    let routes = rpc::routes(backend.auth_service.clone(), backend.recovery.clone());
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(address, async move { shutdown.cancelled().await })?;
    info!(%bound, "backend listening");
    server.await;

    backend.shutdown().await;
    Ok(())
}
