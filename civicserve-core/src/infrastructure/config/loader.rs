use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};

use crate::foundation::{CivicError, Result};
use crate::infrastructure::config::types::AppConfig;

/// File looked up inside the data directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "civicserve.toml";

/// Environment prefix for overrides; nested keys use `__`, e.g.
/// `CIVICSERVE_SERVICE__LISTEN_ADDRESS`.
pub const ENV_PREFIX: &str = "CIVICSERVE_";

/// Loads configuration from `<data_dir>/civicserve.toml` when present,
/// then applies environment overrides.
pub fn load_config(data_dir: &Path) -> Result<AppConfig> {
    let path = data_dir.join(CONFIG_FILE_NAME);
    load_config_from_file(&path, data_dir)
}

/// Loads configuration from an explicit file path. A missing file is not
/// an error; defaults and environment overrides still apply.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        info!("loading config file path={}", path.display());
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("config file absent, using defaults path={}", path.display());
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: AppConfig =
        figment.extract().map_err(|err| CivicError::config(err.to_string()))?;
    postprocess(&mut config, data_dir);
    Ok(config)
}

/// Repairs values an override set to something unusable and pins the
/// effective data directory.
fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.listen_address.trim().is_empty() {
        config.service.listen_address = crate::foundation::DEFAULT_LISTEN_ADDR.to_string();
    }
    config.service.data_dir = data_dir.display().to_string();
    if config.service.body_limit_bytes == 0 {
        config.service.body_limit_bytes = crate::foundation::DEFAULT_BODY_LIMIT_BYTES;
    }
    if config.notify.queue_capacity == 0 {
        config.notify.queue_capacity = 1;
    }
    if config.notify.keepalive_secs == 0 {
        config.notify.keepalive_secs = crate::foundation::DEFAULT_KEEPALIVE_SECS;
    }
    if let Some(token) = &config.service.api_token {
        if token.trim().is_empty() {
            config.service.api_token = None;
        }
    }
}
