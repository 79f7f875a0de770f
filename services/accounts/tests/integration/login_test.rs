use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use unitask_accounts::domain::repository::CredentialHasher;
use unitask_accounts::domain::types::Identity;
use unitask_accounts::error::AccountsServiceError;
use unitask_accounts::infra::hasher::Argon2Hasher;
use unitask_accounts::usecase::login::{EnsureAdminUseCase, LoginInput, LoginUseCase};
use unitask_auth_types::token::validate_access_token;
use unitask_domain::id::IdentityId;
use unitask_domain::role::Role;
use unitask_testing::auth::TEST_JWT_SECRET;

use crate::helpers::{MockIdentityRepo, db_repo, fast_hasher, hash, memory_db};

async fn identity(email: &str, role: Role, password: &str) -> Identity {
    Identity {
        id: IdentityId::generate(),
        email: email.to_owned(),
        role,
        credential_hash: hash(password).await,
    }
}

fn login_usecase(identities: Vec<Identity>) -> LoginUseCase<MockIdentityRepo, Argon2Hasher> {
    LoginUseCase {
        repo: MockIdentityRepo::new(identities),
        hasher: fast_hasher(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

// ── LoginUseCase ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_student_even_with_correct_password() {
    let usecase = login_usecase(vec![
        identity("s@x.edu", Role::Student, "2023000001").await,
    ]);

    let result = usecase.execute(input("s@x.edu", "2023000001")).await;

    assert!(
        matches!(result, Err(AccountsServiceError::AccountNotActivated)),
        "expected AccountNotActivated"
    );
}

#[tokio::test]
async fn should_refuse_lecturer_even_with_correct_password() {
    let usecase = login_usecase(vec![
        identity("l@x.edu", Role::Lecturer, "19780101").await,
    ]);

    let result = usecase.execute(input("l@x.edu", "19780101")).await;

    assert!(matches!(result, Err(AccountsServiceError::AccountNotActivated)));
}

#[tokio::test]
async fn should_answer_unknown_email_like_refused_account() {
    let usecase = login_usecase(vec![]);

    let result = usecase.execute(input("ghost@x.edu", "anything")).await;

    assert!(matches!(result, Err(AccountsServiceError::AccountNotActivated)));
}

#[tokio::test]
async fn should_answer_wrong_admin_password_like_refused_account() {
    let usecase = login_usecase(vec![identity("admin@x.edu", Role::Admin, "s3cret").await]);

    let result = usecase.execute(input("admin@x.edu", "guess")).await;

    assert!(matches!(result, Err(AccountsServiceError::AccountNotActivated)));
}

#[tokio::test]
async fn should_issue_admin_token_for_correct_password() {
    let admin = identity("admin@x.edu", Role::Admin, "s3cret").await;
    let admin_id = admin.id;
    let usecase = login_usecase(vec![admin]);

    let token = usecase
        .execute(input(" admin@x.edu ", "s3cret"))
        .await
        .unwrap();

    let info = validate_access_token(&token.access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.identity_id, admin_id);
    assert_eq!(info.role, Role::Admin);
    assert_eq!(info.access_token_exp, token.expires_at);
}

/// Argon2 hasher that counts how many verifies each login performed.
#[derive(Clone, Default)]
struct CountingHasher {
    verifies: Arc<AtomicUsize>,
    decoys: Arc<AtomicUsize>,
}

impl CredentialHasher for CountingHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, AccountsServiceError> {
        fast_hasher().hash(plaintext).await
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AccountsServiceError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        fast_hasher().verify(plaintext, hash).await
    }

    async fn verify_decoy(&self, plaintext: &str) -> Result<(), AccountsServiceError> {
        self.decoys.fetch_add(1, Ordering::SeqCst);
        fast_hasher().verify_decoy(plaintext).await
    }
}

async fn refusal_work(identities: Vec<Identity>, email: &str, password: &str) -> (usize, usize) {
    let hasher = CountingHasher::default();
    let usecase = LoginUseCase {
        repo: MockIdentityRepo::new(identities),
        hasher: hasher.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = usecase.execute(input(email, password)).await;

    assert!(matches!(result, Err(AccountsServiceError::AccountNotActivated)));
    (
        hasher.verifies.load(Ordering::SeqCst),
        hasher.decoys.load(Ordering::SeqCst),
    )
}

#[tokio::test]
async fn should_spend_one_verify_on_every_refusal_path() {
    let unknown = refusal_work(vec![], "ghost@x.edu", "anything").await;
    let student = refusal_work(
        vec![identity("s@x.edu", Role::Student, "2023000001").await],
        "s@x.edu",
        "2023000001",
    )
    .await;
    let wrong_admin = refusal_work(
        vec![identity("admin@x.edu", Role::Admin, "s3cret").await],
        "admin@x.edu",
        "guess",
    )
    .await;

    assert_eq!(unknown, (0, 1));
    assert_eq!(student, (1, 0));
    assert_eq!(wrong_admin, (1, 0));
}

// ── EnsureAdminUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_seed_admin_with_hashed_password_once() {
    let repo = MockIdentityRepo::new(vec![]);
    let handle = repo.identities_handle();
    let usecase = EnsureAdminUseCase {
        repo,
        hasher: fast_hasher(),
    };

    assert!(usecase.execute("admin@x.edu", "s3cret").await.unwrap());
    assert!(!usecase.execute("admin@x.edu", "other").await.unwrap());

    let identities = handle.lock().unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].role, Role::Admin);
    assert_ne!(identities[0].credential_hash, "s3cret");
}

#[tokio::test]
async fn should_reject_malformed_admin_email() {
    let usecase = EnsureAdminUseCase {
        repo: MockIdentityRepo::new(vec![]),
        hasher: fast_hasher(),
    };

    let err = usecase.execute("admin", "s3cret").await.unwrap_err();

    assert!(matches!(
        err,
        AccountsServiceError::Validation { field: "email", .. }
    ));
}

#[tokio::test]
async fn should_sign_in_admin_seeded_into_store() {
    let db = memory_db().await;
    EnsureAdminUseCase {
        repo: db_repo(&db),
        hasher: fast_hasher(),
    }
    .execute("admin@x.edu", "s3cret")
    .await
    .unwrap();

    let token = LoginUseCase {
        repo: db_repo(&db),
        hasher: fast_hasher(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
    .execute(input("admin@x.edu", "s3cret"))
    .await
    .unwrap();

    assert!(validate_access_token(&token.access_token, TEST_JWT_SECRET).is_ok());
}
