//! Per-client request quotas.

mod limiter;

pub use limiter::*;
