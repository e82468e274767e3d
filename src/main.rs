use chat_auth::logger::*;
use chat_auth::server::*;
use chat_auth::settings::*;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();
    logger.scope(run(cli, logger.clone())).await
}

async fn run(cli: Cli, logger: Logger) -> anyhow::Result<()> {
    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(logger.scope(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("SIGINT received"),
            Err(e) => error!("Could not register SIGINT: {}", e),
        }
        trigger.cancel();
    }));

    match cli.command {
        Command::Backend => run_backend(&project_settings, logger, shutdown).await,
        Command::Gateway => run_gateway(&project_settings, logger, shutdown).await,
    }
}
