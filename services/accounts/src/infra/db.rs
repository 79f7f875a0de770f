use std::time::Duration;

use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, SqlErr, TransactionError, TransactionTrait,
};
use tracing::warn;

use unitask_accounts_schema::{identities, lecturer_profiles, student_profiles};
use unitask_domain::id::{IdentityId, ProfileId};
use unitask_domain::role::{ProfileKind, Role};

use crate::domain::repository::AccountRepository;
use crate::domain::types::{
    AccountChanges, AccountRecord, Identity, NewAccount, ProfileDetails,
};
use crate::error::AccountsServiceError;

// ── Error mapping ────────────────────────────────────────────────────────────

/// Map a unique-constraint message to the duplicate kind it stands for.
///
/// Postgres names the violated index (`uq_identities_email`), SQLite names the
/// column (`UNIQUE constraint failed: identities.email`); both mention the
/// column. `identity_id` collisions are not caller errors and stay unmapped.
pub fn classify_unique_violation(message: &str) -> Option<AccountsServiceError> {
    if message.contains("email") {
        Some(AccountsServiceError::DuplicateEmail)
    } else if message.contains("staff_number") || message.contains("student_number") {
        Some(AccountsServiceError::DuplicateIdentifier)
    } else {
        None
    }
}

fn map_db_err(err: DbErr, context: &'static str) -> AccountsServiceError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        if let Some(duplicate) = classify_unique_violation(&message) {
            warn!(kind = duplicate.kind(), "store rejected duplicate on {context}");
            return duplicate;
        }
    }
    AccountsServiceError::Internal(anyhow::Error::new(err).context(context))
}

fn flatten_txn<T>(
    result: Result<T, TransactionError<AccountsServiceError>>,
    context: &'static str,
) -> Result<T, AccountsServiceError> {
    result.map_err(|e| match e {
        // Begin and commit failures land here, including deferred constraint checks.
        TransactionError::Connection(err) => map_db_err(err, context),
        TransactionError::Transaction(err) => err,
    })
}

// ── Write retry ──────────────────────────────────────────────────────────────

/// Attempts per atomic unit before lock contention is reported as a failure.
const MAX_WRITE_ATTEMPTS: u32 = 8;

/// SQLite refuses a second writer with `SQLITE_BUSY` instead of queueing it
/// behind the first, so a writer that lost the race never sees the winner's
/// row. Postgres blocks on the unique index and reports the violation.
fn is_lock_contention(err: &AccountsServiceError) -> bool {
    let AccountsServiceError::Internal(err) = err else {
        return false;
    };
    err.downcast_ref::<DbErr>().is_some_and(|db_err| {
        let message = db_err.to_string();
        message.contains("database is locked") || message.contains("database table is locked")
    })
}

/// Run `unit` until it stops failing on lock contention. A rerun starts a
/// fresh transaction, so its pre-checks see whatever the winner committed.
async fn with_write_retry<T, F, Fut>(
    context: &'static str,
    mut unit: F,
) -> Result<T, AccountsServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AccountsServiceError>>,
{
    let mut attempt = 1;
    loop {
        match unit().await {
            Err(err) if attempt < MAX_WRITE_ATTEMPTS && is_lock_contention(&err) => {
                warn!(attempt, "store busy on {context}, retrying");
                tokio::time::sleep(Duration::from_millis(5 * u64::from(attempt))).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

// ── Uniqueness guard ─────────────────────────────────────────────────────────

async fn guard_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<IdentityId>,
) -> Result<(), AccountsServiceError> {
    let mut query = identities::Entity::find().filter(identities::Column::Email.eq(email));
    if let Some(IdentityId(own)) = except {
        query = query.filter(identities::Column::Id.ne(own));
    }
    let existing = query
        .one(conn)
        .await
        .map_err(|e| map_db_err(e, "check email uniqueness"))?;
    if existing.is_some() {
        warn!("email already registered");
        return Err(AccountsServiceError::DuplicateEmail);
    }
    Ok(())
}

async fn guard_identifier<C: ConnectionTrait>(
    conn: &C,
    details: &ProfileDetails,
    except: Option<ProfileId>,
) -> Result<(), AccountsServiceError> {
    let taken = match details {
        ProfileDetails::Lecturer { staff_number, .. } => {
            let mut query = lecturer_profiles::Entity::find()
                .filter(lecturer_profiles::Column::StaffNumber.eq(staff_number.as_str()));
            if let Some(ProfileId(own)) = except {
                query = query.filter(lecturer_profiles::Column::Id.ne(own));
            }
            query.one(conn).await.map(|m| m.is_some())
        }
        ProfileDetails::Student { student_number, .. } => {
            let mut query = student_profiles::Entity::find()
                .filter(student_profiles::Column::StudentNumber.eq(student_number.as_str()));
            if let Some(ProfileId(own)) = except {
                query = query.filter(student_profiles::Column::Id.ne(own));
            }
            query.one(conn).await.map(|m| m.is_some())
        }
    }
    .map_err(|e| map_db_err(e, "check role identifier uniqueness"))?;
    if taken {
        warn!(kind = %details.kind(), "role identifier already registered");
        return Err(AccountsServiceError::DuplicateIdentifier);
    }
    Ok(())
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn lecturer_record(
    profile: lecturer_profiles::Model,
    identity: identities::Model,
) -> AccountRecord {
    AccountRecord {
        profile_id: ProfileId(profile.id),
        identity_id: IdentityId(identity.id),
        email: identity.email,
        full_name: profile.full_name,
        details: ProfileDetails::Lecturer {
            staff_number: profile.staff_number,
            department: profile.department,
        },
        active: profile.active,
        created_at: profile.created_at,
    }
}

fn student_record(profile: student_profiles::Model, identity: identities::Model) -> AccountRecord {
    AccountRecord {
        profile_id: ProfileId(profile.id),
        identity_id: IdentityId(identity.id),
        email: identity.email,
        full_name: profile.full_name,
        details: ProfileDetails::Student {
            student_number: profile.student_number,
            enrollment_year: profile.enrollment_year,
        },
        active: profile.active,
        created_at: profile.created_at,
    }
}

fn joined<P>(
    (profile, identity): (P, Option<identities::Model>),
    to_record: fn(P, identities::Model) -> AccountRecord,
) -> Result<AccountRecord, AccountsServiceError> {
    let identity = identity.context("profile row without owning identity")?;
    Ok(to_record(profile, identity))
}

fn identity_from_model(model: identities::Model) -> Result<Identity, AccountsServiceError> {
    let role = model
        .role
        .parse::<Role>()
        .with_context(|| format!("identity {} has unreadable role", model.id))?;
    Ok(Identity {
        id: IdentityId(model.id),
        email: model.email,
        role,
        credential_hash: model.credential_hash,
    })
}

// ── Per-kind statements ──────────────────────────────────────────────────────

async fn insert_profile<C: ConnectionTrait>(
    conn: &C,
    identity: identities::Model,
    account: &NewAccount,
) -> Result<AccountRecord, DbErr> {
    let now = Utc::now();
    let record = match &account.details {
        ProfileDetails::Lecturer {
            staff_number,
            department,
        } => {
            let profile = lecturer_profiles::ActiveModel {
                id: Set(ProfileId::generate().0),
                identity_id: Set(identity.id),
                staff_number: Set(staff_number.clone()),
                full_name: Set(account.full_name.clone()),
                department: Set(department.clone()),
                active: Set(true),
                created_at: Set(now),
            }
            .insert(conn)
            .await?;
            lecturer_record(profile, identity)
        }
        ProfileDetails::Student {
            student_number,
            enrollment_year,
        } => {
            let profile = student_profiles::ActiveModel {
                id: Set(ProfileId::generate().0),
                identity_id: Set(identity.id),
                student_number: Set(student_number.clone()),
                full_name: Set(account.full_name.clone()),
                enrollment_year: Set(enrollment_year.clone()),
                active: Set(true),
                created_at: Set(now),
            }
            .insert(conn)
            .await?;
            student_record(profile, identity)
        }
    };
    Ok(record)
}

/// Identity owning profile `id` of `kind`, if the profile exists.
async fn owning_identity<C: ConnectionTrait>(
    conn: &C,
    kind: ProfileKind,
    id: ProfileId,
) -> Result<Option<IdentityId>, DbErr> {
    let identity_id = match kind {
        ProfileKind::Lecturer => lecturer_profiles::Entity::find_by_id(id.0)
            .one(conn)
            .await?
            .map(|p| p.identity_id),
        ProfileKind::Student => student_profiles::Entity::find_by_id(id.0)
            .one(conn)
            .await?
            .map(|p| p.identity_id),
    };
    Ok(identity_id.map(IdentityId))
}

async fn update_profile<C: ConnectionTrait>(
    conn: &C,
    id: ProfileId,
    identity: identities::Model,
    changes: &AccountChanges,
) -> Result<AccountRecord, DbErr> {
    let account = &changes.account;
    let record = match &account.details {
        ProfileDetails::Lecturer {
            staff_number,
            department,
        } => {
            let profile = lecturer_profiles::ActiveModel {
                id: Set(id.0),
                staff_number: Set(staff_number.clone()),
                full_name: Set(account.full_name.clone()),
                department: Set(department.clone()),
                active: Set(changes.active),
                ..Default::default()
            }
            .update(conn)
            .await?;
            lecturer_record(profile, identity)
        }
        ProfileDetails::Student {
            student_number,
            enrollment_year,
        } => {
            let profile = student_profiles::ActiveModel {
                id: Set(id.0),
                student_number: Set(student_number.clone()),
                full_name: Set(account.full_name.clone()),
                enrollment_year: Set(enrollment_year.clone()),
                active: Set(changes.active),
                ..Default::default()
            }
            .update(conn)
            .await?;
            student_record(profile, identity)
        }
    };
    Ok(record)
}

async fn delete_profile<C: ConnectionTrait>(
    conn: &C,
    kind: ProfileKind,
    id: ProfileId,
) -> Result<u64, DbErr> {
    let result = match kind {
        ProfileKind::Lecturer => lecturer_profiles::Entity::delete_by_id(id.0).exec(conn).await?,
        ProfileKind::Student => student_profiles::Entity::delete_by_id(id.0).exec(conn).await?,
    };
    Ok(result.rows_affected)
}

// ── Atomic units ─────────────────────────────────────────────────────────────

async fn create_once(
    db: &DatabaseConnection,
    account: NewAccount,
    credential_hash: String,
) -> Result<AccountRecord, AccountsServiceError> {
    let result = db
        .transaction::<_, AccountRecord, AccountsServiceError>(|txn| {
            Box::pin(async move {
                guard_email(txn, &account.email, None).await?;
                guard_identifier(txn, &account.details, None).await?;

                let identity = identities::ActiveModel {
                    id: Set(IdentityId::generate().0),
                    email: Set(account.email.clone()),
                    credential_hash: Set(credential_hash),
                    role: Set(account.kind().role().as_str().to_owned()),
                    created_at: Set(Utc::now()),
                }
                .insert(txn)
                .await
                .map_err(|e| map_db_err(e, "insert identity"))?;

                insert_profile(txn, identity, &account)
                    .await
                    .map_err(|e| map_db_err(e, "insert profile"))
            })
        })
        .await;
    flatten_txn(result, "create account")
}

async fn update_once(
    db: &DatabaseConnection,
    kind: ProfileKind,
    id: ProfileId,
    changes: AccountChanges,
) -> Result<AccountRecord, AccountsServiceError> {
    let result = db
        .transaction::<_, AccountRecord, AccountsServiceError>(|txn| {
            Box::pin(async move {
                let identity_id = owning_identity(txn, kind, id)
                    .await
                    .map_err(|e| map_db_err(e, "resolve owning identity"))?
                    .ok_or(AccountsServiceError::AccountNotFound)?;

                guard_email(txn, &changes.account.email, Some(identity_id)).await?;
                guard_identifier(txn, &changes.account.details, Some(id)).await?;

                let identity = identities::ActiveModel {
                    id: Set(identity_id.0),
                    email: Set(changes.account.email.clone()),
                    ..Default::default()
                }
                .update(txn)
                .await
                .map_err(|e| map_db_err(e, "update identity email"))?;

                update_profile(txn, id, identity, &changes)
                    .await
                    .map_err(|e| map_db_err(e, "update profile"))
            })
        })
        .await;
    flatten_txn(result, "update account")
}

async fn delete_once(
    db: &DatabaseConnection,
    kind: ProfileKind,
    id: ProfileId,
) -> Result<(), AccountsServiceError> {
    let result = db
        .transaction::<_, (), AccountsServiceError>(|txn| {
            Box::pin(async move {
                let identity_id = owning_identity(txn, kind, id)
                    .await
                    .map_err(|e| map_db_err(e, "resolve owning identity"))?
                    .ok_or(AccountsServiceError::AccountNotFound)?;

                delete_profile(txn, kind, id)
                    .await
                    .map_err(|e| map_db_err(e, "delete profile"))?;

                let deleted = identities::Entity::delete_by_id(identity_id.0)
                    .exec(txn)
                    .await
                    .map_err(|e| map_db_err(e, "delete identity"))?;
                // Profile and identity leave together or not at all.
                if deleted.rows_affected != 1 {
                    return Err(anyhow!("identity {identity_id} vanished during delete").into());
                }
                Ok(())
            })
        })
        .await;
    flatten_txn(result, "delete account")
}

async fn ensure_admin_once(
    db: &DatabaseConnection,
    email: String,
    credential_hash: String,
) -> Result<bool, AccountsServiceError> {
    let result = db
        .transaction::<_, bool, AccountsServiceError>(|txn| {
            Box::pin(async move {
                let existing = identities::Entity::find()
                    .filter(identities::Column::Email.eq(email.as_str()))
                    .one(txn)
                    .await
                    .map_err(|e| map_db_err(e, "find admin identity"))?;
                if existing.is_some() {
                    return Ok(false);
                }
                identities::ActiveModel {
                    id: Set(IdentityId::generate().0),
                    email: Set(email),
                    credential_hash: Set(credential_hash),
                    role: Set(Role::Admin.as_str().to_owned()),
                    created_at: Set(Utc::now()),
                }
                .insert(txn)
                .await
                .map_err(|e| map_db_err(e, "insert admin identity"))?;
                Ok(true)
            })
        })
        .await;
    flatten_txn(result, "ensure admin")
}

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn create(
        &self,
        account: &NewAccount,
        credential_hash: &str,
    ) -> Result<AccountRecord, AccountsServiceError> {
        with_write_retry("create account", || {
            create_once(&self.db, account.clone(), credential_hash.to_owned())
        })
        .await
    }

    async fn list(&self, kind: ProfileKind) -> Result<Vec<AccountRecord>, AccountsServiceError> {
        match kind {
            ProfileKind::Lecturer => lecturer_profiles::Entity::find()
                .find_also_related(identities::Entity)
                .order_by_asc(lecturer_profiles::Column::FullName)
                .order_by_asc(lecturer_profiles::Column::Id)
                .all(&self.db)
                .await
                .context("list lecturer profiles")?
                .into_iter()
                .map(|row| joined(row, lecturer_record))
                .collect(),
            ProfileKind::Student => student_profiles::Entity::find()
                .find_also_related(identities::Entity)
                .order_by_desc(student_profiles::Column::EnrollmentYear)
                .order_by_asc(student_profiles::Column::FullName)
                .order_by_asc(student_profiles::Column::Id)
                .all(&self.db)
                .await
                .context("list student profiles")?
                .into_iter()
                .map(|row| joined(row, student_record))
                .collect(),
        }
    }

    async fn get(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> Result<Option<AccountRecord>, AccountsServiceError> {
        match kind {
            ProfileKind::Lecturer => lecturer_profiles::Entity::find_by_id(id.0)
                .find_also_related(identities::Entity)
                .one(&self.db)
                .await
                .context("get lecturer profile")?
                .map(|row| joined(row, lecturer_record))
                .transpose(),
            ProfileKind::Student => student_profiles::Entity::find_by_id(id.0)
                .find_also_related(identities::Entity)
                .one(&self.db)
                .await
                .context("get student profile")?
                .map(|row| joined(row, student_record))
                .transpose(),
        }
    }

    async fn update(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        changes: &AccountChanges,
    ) -> Result<AccountRecord, AccountsServiceError> {
        if changes.account.kind() != kind {
            return Err(anyhow!("{} changes sent to a {kind} profile", changes.account.kind()).into());
        }
        with_write_retry("update account", || {
            update_once(&self.db, kind, id, changes.clone())
        })
        .await
    }

    async fn delete(&self, kind: ProfileKind, id: ProfileId) -> Result<(), AccountsServiceError> {
        with_write_retry("delete account", || delete_once(&self.db, kind, id)).await
    }

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Identity>, AccountsServiceError> {
        identities::Entity::find()
            .filter(identities::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find identity by email")?
            .map(identity_from_model)
            .transpose()
    }

    async fn ensure_admin(
        &self,
        email: &str,
        credential_hash: &str,
    ) -> Result<bool, AccountsServiceError> {
        let seeded = with_write_retry("ensure admin", || {
            ensure_admin_once(&self.db, email.to_owned(), credential_hash.to_owned())
        })
        .await;
        match seeded {
            // Another instance seeded it first.
            Err(AccountsServiceError::DuplicateEmail) => Ok(false),
            other => other,
        }
    }
}
