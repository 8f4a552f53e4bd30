use std::sync::Arc;

use crate::infrastructure::broadcast::Broadcaster;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::directory::Directory;
use crate::infrastructure::mailer::Mailer;
use crate::infrastructure::storage::Store;

/// Shared collaborators threaded through every application operation.
#[derive(Clone)]
pub struct EngineContext {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub broadcaster: Arc<Broadcaster>,
    pub directory: Arc<dyn Directory>,
    pub mailer: Arc<dyn Mailer>,
}
