use serde::{Deserialize, Serialize};

use crate::domain::{Profile, RequestLimits};
use crate::foundation::{
    DEFAULT_BODY_LIMIT_BYTES, DEFAULT_CONNECTION_QUEUE_CAPACITY, DEFAULT_KEEPALIVE_SECS,
    DEFAULT_LISTEN_ADDR,
};

/// HTTP process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address, e.g. `127.0.0.1:8490`.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Shared secret required on `/api` (and `/ready`, `/metrics`) as a
    /// Bearer token or `x-api-key` header. Unset disables the check.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Directory the config file is resolved against.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Request body limit in bytes.
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,

    /// Per-client sustained request rate. Unset uses the built-in default.
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,

    /// Per-client burst allowance. Unset uses the built-in default.
    #[serde(default)]
    pub rate_limit_burst: Option<u32>,
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_body_limit_bytes() -> usize {
    DEFAULT_BODY_LIMIT_BYTES
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            listen_address: default_listen_address(),
            api_token: None,
            data_dir: default_data_dir(),
            body_limit_bytes: default_body_limit_bytes(),
            rate_limit_rps: None,
            rate_limit_burst: None,
        }
    }
}

/// Live notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Bound of each per-connection queue. Slow consumers lose events
    /// past this depth.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// SSE keepalive interval in seconds.
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// Record published notifications in the store's audit log.
    #[serde(default = "default_audit_log")]
    pub audit_log: bool,
}

fn default_queue_capacity() -> usize {
    DEFAULT_CONNECTION_QUEUE_CAPACITY
}

fn default_keepalive_secs() -> u64 {
    DEFAULT_KEEPALIVE_SECS
}

fn default_audit_log() -> bool {
    true
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            queue_capacity: default_queue_capacity(),
            keepalive_secs: default_keepalive_secs(),
            audit_log: default_audit_log(),
        }
    }
}

/// Outbound mail settings. An empty relay URL disables real delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub relay_url: String,
    #[serde(default)]
    pub from_address: String,
}

/// Seed profiles for the static user directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub limits: RequestLimits,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}
