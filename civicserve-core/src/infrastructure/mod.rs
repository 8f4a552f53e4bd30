//! Infrastructure layer: storage, live fan-out, user directory, outbound
//! mail, configuration and logging.

pub mod broadcast;
pub mod config;
pub mod directory;
pub mod logging;
pub mod mailer;
pub mod storage;
