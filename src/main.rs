use anyhow::Context;
use clap::Parser;
use orders_gateway::utils::{logger, validation::Validate};
use orders_gateway::{router, CliConfig, OdooClient, OrderFetcher};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting orders-gateway");
    tracing::debug!(
        "ERP {} db={} user={}",
        config.odoo.url,
        config.odoo.db,
        config.odoo.username
    );

    let client = OdooClient::from_config(&config)?;
    let fetcher = Arc::new(OrderFetcher::new(client, config.bulk_read_query()));
    let app = router(fetcher, config.cors())?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(
        "🚀 Serving GET /orders on http://{} (CORS origin {})",
        listener.local_addr()?,
        config.cors().allowed_origin()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
