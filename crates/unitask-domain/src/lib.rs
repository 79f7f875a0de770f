//! Domain types shared across Unitask services.
//!
//! Pure types with no framework dependencies.

pub mod id;
pub mod role;
