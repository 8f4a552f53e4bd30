//! Domain layer: the canonical service-request model, the lifecycle and
//! assignment state machines, and input validation rules.

pub mod assignment;
pub mod model;
pub mod status;
pub mod validation;

pub use assignment::*;
pub use model::*;
pub use status::*;
pub use validation::*;
