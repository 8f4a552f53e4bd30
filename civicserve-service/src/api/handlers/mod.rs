//! REST handlers. Each handler extracts the gateway-vouched [`Actor`]
//! from the request extensions, calls one application operation and
//! wraps the result in the `{"data": ...}` envelope.

pub mod alarms;
pub mod assignments;
pub mod directory;
pub mod health;
pub mod notifications;
pub mod requests;

use civicserve_core::foundation::CivicError;

use crate::api::error::ApiResult;
use crate::service::metrics::Metrics;

/// Counts the operation outcome before handing the result back.
fn observed<T>(
    metrics: &Metrics,
    operation: &'static str,
    result: Result<T, CivicError>,
) -> ApiResult<T> {
    metrics.observe_operation(operation, result.is_ok());
    result.map_err(Into::into)
}
