//! Observability module - request IDs and alerting.

mod alert;
mod request_id;

pub use alert::{AlertConfig, AlertLayer};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdMiddleware};
