//! Persistence for requests, the assignment ledger and the notification
//! audit log.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{RequestChange, RequestFilter, Store};
