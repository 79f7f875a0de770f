//! Account roles and the provisionable profile kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried by an identity. Fixed at creation.
///
/// Wire and storage format: lowercase string (`"admin"`, `"lecturer"`, `"student"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lecturer => "lecturer",
            Self::Student => "student",
        }
    }

    /// The profile kind backing this role, if the role is provisionable.
    pub fn profile_kind(self) -> Option<ProfileKind> {
        match self {
            Self::Admin => None,
            Self::Lecturer => Some(ProfileKind::Lecturer),
            Self::Student => Some(ProfileKind::Student),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "lecturer" => Ok(Self::Lecturer),
            "student" => Ok(Self::Student),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Role classes an admin can provision. Each kind owns its own profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Lecturer,
    Student,
}

impl ProfileKind {
    pub fn role(self) -> Role {
        match self {
            Self::Lecturer => Role::Lecturer,
            Self::Student => Role::Student,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.role().as_str()
    }

    /// Name of the role-specific identifier field for this kind.
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::Lecturer => "staff_number",
            Self::Student => "student_number",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical names plus the legacy `dosen` / `mahasiswa` path segments.
impl FromStr for ProfileKind {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lecturer" | "dosen" => Ok(Self::Lecturer),
            "student" | "mahasiswa" => Ok(Self::Student),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
