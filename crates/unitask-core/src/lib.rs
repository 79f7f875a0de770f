//! Service plumbing shared by every Unitask binary: configuration loading,
//! tracing setup, request ids, health probes and the common error body.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod tracing;
