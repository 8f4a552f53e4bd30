//! Foundation layer: error taxonomy, identifiers, constants and small
//! utilities shared by every other layer.

pub mod constants;
pub mod error;
pub mod time;
pub mod types;

pub use constants::*;
pub use error::*;
pub use time::*;
pub use types::*;
