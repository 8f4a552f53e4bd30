//! Service configuration: TOML file plus `CIVICSERVE_`-prefixed
//! environment overrides layered over built-in defaults.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
