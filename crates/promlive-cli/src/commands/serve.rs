use std::net::SocketAddr;

use tracing::info;

use super::{RunningMonitor, ScanArgs};

pub async fn serve(args: &ScanArgs, listen: Option<String>) -> anyhow::Result<()> {
    let config = args.load()?;
    let listen = listen.unwrap_or_else(|| config.server.listen.clone());
    let addr: SocketAddr = listen.parse()?;

    let monitor = RunningMonitor::start(&config)?;
    let router = promlive_api::build_router(monitor.handle.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, url = %config.scan.url, "API server starting");

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    monitor.stop().await;
    info!("promlive stopped");
    Ok(())
}
