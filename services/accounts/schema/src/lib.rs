//! sea-orm entities for the accounts service tables.

pub mod identities;
pub mod lecturer_profiles;
pub mod student_profiles;
