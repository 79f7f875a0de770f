//! Auth types shared across Unitask services.
//!
//! Provides JWT issue/validation and the `AdminIdentity` extractor that guards
//! the account administration surface.

pub mod admin;
pub mod token;
