use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use civicserve_core::application::EngineContext;
use civicserve_core::foundation::{
    Result, DEFAULT_RATE_LIMIT_BURST, DEFAULT_RATE_LIMIT_RPS,
};
use civicserve_core::infrastructure::broadcast::Broadcaster;
use civicserve_core::infrastructure::config::{load_config, load_config_from_file, AppConfig};
use civicserve_core::infrastructure::directory::StaticDirectory;
use civicserve_core::infrastructure::mailer::{LogMailer, Mailer, RelayMailer};
use civicserve_core::infrastructure::storage::MemoryStore;
use civicserve_service::api::{ApiState, RateLimiter};
use civicserve_service::service::metrics::Metrics;

use crate::cli::Cli;

pub fn init_logging(cli: &Cli) {
    civicserve_core::infrastructure::logging::init_logger(cli.log_dir.as_deref(), &cli.log_level);
}

pub fn load_app_config(cli: &Cli) -> Result<AppConfig> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| ".".into());
    let mut config = match &cli.config {
        Some(path) => load_config_from_file(path, &data_dir),
        None => load_config(&data_dir),
    }?;
    if let Some(listen) = &cli.listen {
        config.service.listen_address = listen.clone();
    }
    if config.directory.profiles.is_empty() {
        warn!("directory has no seeded profiles; allocation and alarms will find nobody");
    }
    Ok(config)
}

pub fn build_engine(config: &AppConfig) -> EngineContext {
    let mailer: Arc<dyn Mailer> = if config.mail.relay_url.trim().is_empty() {
        info!("mail relay unset, mail delivery suppressed");
        Arc::new(LogMailer)
    } else {
        info!("mail relay configured relay_url={}", config.mail.relay_url);
        Arc::new(RelayMailer::new(
            config.mail.relay_url.clone(),
            config.mail.from_address.clone(),
        ))
    };
    EngineContext {
        config: config.clone(),
        store: Arc::new(MemoryStore::new()),
        broadcaster: Arc::new(Broadcaster::new(config.notify.queue_capacity)),
        directory: Arc::new(StaticDirectory::new(config.directory.profiles.clone())),
        mailer,
    }
}

pub fn build_state(engine: EngineContext, metrics: Arc<Metrics>) -> Arc<ApiState> {
    let config = engine.config.clone();
    Arc::new(ApiState {
        engine,
        api_token: config.service.api_token.clone(),
        metrics,
        rate_limiter: Arc::new(RateLimiter::new()),
        rate_limit_rps: config.service.rate_limit_rps.unwrap_or(DEFAULT_RATE_LIMIT_RPS),
        rate_limit_burst: config.service.rate_limit_burst.unwrap_or(DEFAULT_RATE_LIMIT_BURST),
        keepalive_secs: config.notify.keepalive_secs,
        body_limit_bytes: config.service.body_limit_bytes,
    })
}

pub fn log_startup_banner(config: &AppConfig, config_path: Option<&Path>) {
    info!(
        "civicserve starting listen_address={} config_path={} profiles={} queue_capacity={} audit_log={}",
        config.service.listen_address,
        config_path.map(|p| p.display().to_string()).unwrap_or_else(|| "<default>".to_string()),
        config.directory.profiles.len(),
        config.notify.queue_capacity,
        config.notify.audit_log
    );
}
