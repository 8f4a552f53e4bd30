//! Application layer: the operations callers drive, orchestrating domain
//! rules over storage, fan-out, directory and mail.

pub mod allocation;
pub mod context;
pub mod escalation;
pub mod lifecycle;
pub mod notify;

pub use allocation::{assign_work, request_assignments, staff_assignments, update_assignment};
pub use context::EngineContext;
pub use escalation::{raise_alarm, raise_request_alarm, AlarmDelivery};
pub use lifecycle::{
    create_request, fetch_history, fetch_request, list_requests, rate_request, reopen_request,
    transition_request, TransitionOutcome,
};
pub use notify::{send_to_all, send_to_user};
