use chat_auth::logger::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();

    logger
        .scope(async {
            trace!("bootstrap trace log");
            debug!("bootstrap debug log");
            info!("bootstrap info log");
        })
        .await;

    let config = LogConfig {
        filter: "debug".to_string(),
    };
    logger.reload_from_config(&config)?;

    logger
        .scope(async {
            trace!("application trace log");
            debug!("application debug log");
            info!("application info log");
        })
        .await;

    // outside any scope: not routed to this logger
    info!("dropped");

    Ok(())
}
