use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use unitask_auth_types::admin::AdminIdentity;
use unitask_domain::id::ProfileId;
use unitask_domain::role::{ProfileKind, Role};

use crate::domain::types::{AccountFields, AccountRecord, ProfileDetails};
use crate::error::AccountsServiceError;
use crate::handlers::extract::JsonBody;
use crate::state::AppState;
use crate::usecase::account::{
    CreateAccountUseCase, DeleteAccountUseCase, GetAccountUseCase, ListAccountsUseCase,
    UpdateAccountInput, UpdateAccountUseCase,
};

fn parse_kind(raw: &str) -> Result<ProfileKind, AccountsServiceError> {
    raw.parse()
        .map_err(|_| AccountsServiceError::validation("kind", "must be lecturer or student"))
}

fn parse_id(raw: &str) -> Result<ProfileId, AccountsServiceError> {
    raw.parse()
        .map_err(|_| AccountsServiceError::validation("id", "must be a UUID"))
}

// ── Request / response bodies ────────────────────────────────────────────────

/// Body of create and update. Missing fields deserialize empty so validation
/// can name them; the legacy field names are accepted as aliases.
#[derive(Deserialize)]
pub struct AccountRequest {
    #[serde(default)]
    pub email: String,
    #[serde(
        default,
        alias = "staff_number",
        alias = "student_number",
        alias = "nip",
        alias = "nim"
    )]
    pub role_identifier: String,
    #[serde(default, alias = "nama_lengkap")]
    pub full_name: String,
    #[serde(default, alias = "departemen")]
    pub department: Option<String>,
    #[serde(default, alias = "angkatan")]
    pub enrollment_year: Option<String>,
    /// Update only.
    #[serde(default, alias = "is_active")]
    pub active: Option<bool>,
}

impl AccountRequest {
    fn into_parts(self) -> (AccountFields, Option<bool>) {
        let fields = AccountFields {
            email: self.email,
            role_identifier: self.role_identifier,
            full_name: self.full_name,
            department: self.department,
            enrollment_year: self.enrollment_year,
        };
        (fields, self.active)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ProfileDetailsResponse {
    Lecturer {
        staff_number: String,
        department: String,
    },
    Student {
        student_number: String,
        enrollment_year: String,
    },
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub identity_id: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    #[serde(flatten)]
    pub details: ProfileDetailsResponse,
    pub active: bool,
    /// RFC 3339, UTC, millisecond precision.
    pub created_at: String,
}

impl From<AccountRecord> for AccountResponse {
    fn from(record: AccountRecord) -> Self {
        let role = record.role();
        let details = match record.details {
            ProfileDetails::Lecturer {
                staff_number,
                department,
            } => ProfileDetailsResponse::Lecturer {
                staff_number,
                department,
            },
            ProfileDetails::Student {
                student_number,
                enrollment_year,
            } => ProfileDetailsResponse::Student {
                student_number,
                enrollment_year,
            },
        };
        Self {
            id: record.profile_id.to_string(),
            identity_id: record.identity_id.to_string(),
            email: record.email,
            role,
            full_name: record.full_name,
            details,
            active: record.active,
            created_at: record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Serialize)]
pub struct CreatedAccountResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Shown once. Must be rotated at first login.
    pub default_password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── POST /accounts/{kind} ────────────────────────────────────────────────────

pub async fn create_account(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    JsonBody(body): JsonBody<AccountRequest>,
) -> Result<(StatusCode, Json<CreatedAccountResponse>), AccountsServiceError> {
    let kind = parse_kind(&kind)?;
    let (fields, _) = body.into_parts();
    let usecase = CreateAccountUseCase {
        repo: state.account_repo(),
        hasher: state.hasher.clone(),
    };
    let created = usecase.execute(kind, fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedAccountResponse {
            account: created.record.into(),
            default_password: created.default_password,
        }),
    ))
}

// ── GET /accounts/{kind} ─────────────────────────────────────────────────────

pub async fn list_accounts(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<AccountResponse>>, AccountsServiceError> {
    let kind = parse_kind(&kind)?;
    let usecase = ListAccountsUseCase {
        repo: state.account_repo(),
    };
    let records = usecase.execute(kind).await?;
    Ok(Json(records.into_iter().map(AccountResponse::from).collect()))
}

// ── GET /accounts/{kind}/{id} ────────────────────────────────────────────────

pub async fn get_account(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<AccountResponse>, AccountsServiceError> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let usecase = GetAccountUseCase {
        repo: state.account_repo(),
    };
    let record = usecase.execute(kind, id).await?;
    Ok(Json(record.into()))
}

// ── PUT /accounts/{kind}/{id} ────────────────────────────────────────────────

pub async fn update_account(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    JsonBody(body): JsonBody<AccountRequest>,
) -> Result<Json<AccountResponse>, AccountsServiceError> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let (fields, active) = body.into_parts();
    let usecase = UpdateAccountUseCase {
        repo: state.account_repo(),
    };
    let record = usecase
        .execute(kind, id, UpdateAccountInput { fields, active })
        .await?;
    Ok(Json(record.into()))
}

// ── DELETE /accounts/{kind}/{id} ─────────────────────────────────────────────

pub async fn delete_account(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AccountsServiceError> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let usecase = DeleteAccountUseCase {
        repo: state.account_repo(),
    };
    usecase.execute(kind, id).await?;
    Ok(Json(MessageResponse {
        message: "account deleted",
    }))
}
