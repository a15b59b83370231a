use print_agent::config::{AgentConfig, config_dir, config_file};
use print_agent::dispatch::TransportDispatcher;
use print_agent::ingress::{EventClient, IngressHandler};
use print_agent::queue::JobQueue;
use print_agent::registry::PrinterRegistry;
use print_agent::logger;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging (daily files under <config_dir>/logs, 7-day retention)
    let log_dir = config_dir().join("logs");
    logger::init_logger(std::env::var("LOG_LEVEL").ok().as_deref(), Some(&log_dir));
    let _ = logger::cleanup_old_logs(&log_dir);

    tracing::info!("Delivery print agent starting");

    // 2. Configuration
    let config = AgentConfig::load();
    tracing::info!(
        printers = config.printers.len(),
        server = %config.server_url,
        "configuration loaded"
    );

    // 3. Wire the queue, registry and dispatcher
    let registry = Arc::new(PrinterRegistry::new(config.printers.clone()));
    let dispatcher = Arc::new(TransportDispatcher);
    let queue = JobQueue::new(
        Arc::clone(&registry),
        dispatcher,
        config.receipt_defaults(),
    );
    let handler = IngressHandler::new(Arc::clone(&queue), Arc::clone(&registry));

    // 4. Graceful shutdown on ctrl-c
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        });
    }

    // 5. Event channel
    if config.server_url.is_empty() || config.token.is_empty() {
        tracing::warn!(
            config = %config_file().display(),
            "server_url or token not configured; event channel suspended"
        );
        shutdown.cancelled().await;
    } else {
        let client = EventClient::new(&config.server_url, &config.token, handler);
        client.run(shutdown).await;
    }

    // let an in-flight job finish before exiting
    queue.wait_idle().await;
    tracing::info!("print agent stopped");
    Ok(())
}
