//! Test utilities for Unitask services.
//!
//! Provides signed bearer tokens for each role and small request/response helpers.
//! Dev-dependency only.

pub mod auth;
pub mod http;
