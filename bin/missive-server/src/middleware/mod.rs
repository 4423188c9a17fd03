//! HTTP middleware stack: CORS policy and per-request tracing.

pub mod cors;
pub mod trace;
