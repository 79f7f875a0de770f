use chrono::{DateTime, Utc};

use unitask_domain::id::{IdentityId, ProfileId};
use unitask_domain::role::{ProfileKind, Role};

use crate::error::AccountsServiceError;

/// Role-specific half of an account. One variant per profile table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileDetails {
    Lecturer {
        staff_number: String,
        department: String,
    },
    Student {
        /// Exactly ten ASCII digits.
        student_number: String,
        /// `20xx`.
        enrollment_year: String,
    },
}

impl ProfileDetails {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Lecturer { .. } => ProfileKind::Lecturer,
            Self::Student { .. } => ProfileKind::Student,
        }
    }

    /// The staff number or student number, unique within its own profile table.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Lecturer { staff_number, .. } => staff_number,
            Self::Student { student_number, .. } => student_number,
        }
    }
}

/// Validated account fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub details: ProfileDetails,
}

impl NewAccount {
    pub fn kind(&self) -> ProfileKind {
        self.details.kind()
    }
}

/// Full replacement of an account's mutable fields. The credential is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    pub account: NewAccount,
    pub active: bool,
}

/// Identity joined with its profile, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub profile_id: ProfileId,
    pub identity_id: IdentityId,
    pub email: String,
    pub full_name: String,
    pub details: ProfileDetails,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn kind(&self) -> ProfileKind {
        self.details.kind()
    }

    pub fn role(&self) -> Role {
        self.kind().role()
    }
}

/// Identity row as seen by the login boundary.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub credential_hash: String,
}

/// Unvalidated account fields as submitted by a caller.
#[derive(Debug, Clone, Default)]
pub struct AccountFields {
    pub email: String,
    pub role_identifier: String,
    pub full_name: String,
    /// Required for lecturers, ignored for students.
    pub department: Option<String>,
    /// Required for students, ignored for lecturers.
    pub enrollment_year: Option<String>,
}

/// Validate raw fields for `kind`. Never touches the store.
///
/// Presence of every required field is checked first, then formats, so a form
/// with several blanks reports a missing field before a malformed one.
pub fn validate_account(
    kind: ProfileKind,
    fields: AccountFields,
) -> Result<NewAccount, AccountsServiceError> {
    let email = required("email", &fields.email)?;
    let identifier = required(kind.identifier_field(), &fields.role_identifier)?;
    let full_name = required("full_name", &fields.full_name)?;

    let details = match kind {
        ProfileKind::Lecturer => {
            let department = required("department", fields.department.as_deref().unwrap_or(""))?;
            validate_email(&email)?;
            ProfileDetails::Lecturer {
                staff_number: identifier,
                department,
            }
        }
        ProfileKind::Student => {
            let enrollment_year = required(
                "enrollment_year",
                fields.enrollment_year.as_deref().unwrap_or(""),
            )?;
            validate_email(&email)?;
            validate_student_number(&identifier)?;
            validate_enrollment_year(&enrollment_year)?;
            ProfileDetails::Student {
                student_number: identifier,
                enrollment_year,
            }
        }
    };

    Ok(NewAccount {
        email,
        full_name,
        details,
    })
}

fn required(field: &'static str, value: &str) -> Result<String, AccountsServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountsServiceError::validation(field, "is required"));
    }
    Ok(trimmed.to_owned())
}

/// Accepts `local@domain.tld`: exactly one `@`, no whitespace, and a dot inside
/// the domain with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn validate_email(email: &str) -> Result<(), AccountsServiceError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AccountsServiceError::validation(
            "email",
            "must be a valid email address",
        ))
    }
}

/// Student numbers are exactly ten ASCII digits.
pub fn is_valid_student_number(student_number: &str) -> bool {
    student_number.len() == 10 && student_number.bytes().all(|b| b.is_ascii_digit())
}

fn validate_student_number(student_number: &str) -> Result<(), AccountsServiceError> {
    if is_valid_student_number(student_number) {
        Ok(())
    } else {
        Err(AccountsServiceError::validation(
            "student_number",
            "must be exactly 10 digits",
        ))
    }
}

/// Enrollment years are `2000`..=`2099`, written with four digits.
pub fn is_valid_enrollment_year(year: &str) -> bool {
    year.len() == 4 && year.starts_with("20") && year.bytes().all(|b| b.is_ascii_digit())
}

fn validate_enrollment_year(year: &str) -> Result<(), AccountsServiceError> {
    if is_valid_enrollment_year(year) {
        Ok(())
    } else {
        Err(AccountsServiceError::validation(
            "enrollment_year",
            "must be a year between 2000 and 2099",
        ))
    }
}
