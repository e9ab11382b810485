use clap::Parser;
use cf_core::{Error, Result};
use cf_ingest::{init_logging, CurrentsClient, Ingestor};
use cf_web::{create_app, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod config;

use config::Cli;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("👋 Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment and flags still apply.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let storage = cf_storage::create_storage(cli.storage.as_str(), cli.database_url.as_deref()).await?;

    let mut client = CurrentsClient::new(cli.api_key.clone(), cli.endpoint.clone())?
        .with_query(cli.search_query());
    if let Some(timeout) = cli.fetch_timeout {
        client = client.with_timeout(timeout.0);
    }
    info!(
        endpoint = %cli.endpoint,
        keywords = %cli.keywords,
        country = %cli.country,
        "📡 Currents client configured"
    );
    let ingestor = Ingestor::new(Arc::new(client), storage.clone());

    if cli.once {
        let report = ingestor
            .run_cycle()
            .await?
            .ok_or_else(|| Error::Upstream("Another ingestion cycle is already running".to_string()))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let scheduler = ingestor.spawn(cli.interval.0);

    let addr = cli.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("🚀 Server running on http://{}", addr);

    let app = create_app(AppState::new(storage));
    let served = cf_web::serve(listener, app, shutdown_signal()).await;

    scheduler.shutdown().await;
    served?;
    Ok(())
}
