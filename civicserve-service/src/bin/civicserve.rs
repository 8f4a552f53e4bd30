#[path = "civicserve/cli.rs"]
mod cli;
#[path = "civicserve/setup.rs"]
mod setup;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use civicserve_core::foundation::CivicError;
use civicserve_service::api::run_http_server;
use civicserve_service::service::metrics::Metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Cli::parse_args();
    setup::init_logging(&args);
    info!("civicserve starting log_level={}", args.log_level);

    let config = setup::load_app_config(&args)?;
    setup::log_startup_banner(&config, args.config.as_deref());

    let addr: SocketAddr = config
        .service
        .listen_address
        .parse()
        .map_err(|err| CivicError::config(format!("invalid listen_address: {err}")))?;

    let engine = setup::build_engine(&config);
    let broadcaster = engine.broadcaster.clone();
    let metrics = Arc::new(Metrics::new()?);
    let state = setup::build_state(engine, metrics.clone());

    spawn_status_reporter(metrics);

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("shutdown signal listener failed error={}", err);
        }
        info!("shutdown signal received");
    };
    run_http_server(addr, state, shutdown).await?;

    // End every open SSE stream before the process exits.
    broadcaster.drain();
    info!("civicserve stopped");
    Ok(())
}

fn spawn_status_reporter(metrics: Arc<Metrics>) {
    tokio::spawn(async move {
        let interval_seconds = 300u64;
        info!("status reporter started interval_seconds={}", interval_seconds);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = metrics.snapshot();
            info!(
                "periodic status report uptime_minutes={} operations_ok={} operations_failed={} streams_open={} streams_opened_total={}",
                snapshot.uptime.as_secs() / 60,
                snapshot.operations_ok,
                snapshot.operations_failed,
                snapshot.streams_open,
                snapshot.streams_opened
            );
        }
    });
}
