use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use unitask_accounts::router::build_router;
use unitask_accounts::usecase::login::EnsureAdminUseCase;
use unitask_domain::id::IdentityId;
use unitask_domain::role::Role;
use unitask_testing::auth::MockAuth;
use unitask_testing::http::{json_body, request, text_body};

use crate::helpers::{db_repo, fast_hasher, memory_db, offline_state, snapshot, test_state};

async fn app() -> (Router, sea_orm::DatabaseConnection) {
    let db = memory_db().await;
    (build_router(test_state(&db)), db)
}

fn jane() -> serde_json::Value {
    json!({
        "email": "a@x.edu",
        "student_number": "2023000001",
        "full_name": "Jane Doe",
        "enrollment_year": "2023",
    })
}

// ── Unguarded routes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_banner_and_health() {
    let (app, _db) = app().await;

    let resp = app.clone().oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        text_body(resp).await,
        "task management accounts service is running"
    );

    let resp = app
        .clone()
        .oneshot(request("GET", "/healthz", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_return_json_not_found_for_unknown_route() {
    let (app, _db) = app().await;

    let resp = app
        .oneshot(request("GET", "/nope", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn should_echo_request_id() {
    let (app, _db) = app().await;

    let resp = app
        .oneshot(request("GET", "/healthz", None, None))
        .await
        .unwrap();

    let id = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(id.parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn should_report_ready_when_store_answers() {
    let (app, _db) = app().await;

    let resp = app
        .oneshot(request("GET", "/readyz", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_report_unready_without_store() {
    let app = build_router(offline_state(&["*"]));

    let resp = app
        .oneshot(request("GET", "/readyz", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ── CORS ─────────────────────────────────────────────────────────────────────

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/accounts/student")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn should_answer_preflight_from_any_origin_by_default() {
    let app = build_router(offline_state(&["*"]));

    let resp = app.oneshot(preflight("http://localhost:3000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-methods"));
    assert!(headers.contains_key("access-control-allow-headers"));
}

#[tokio::test]
async fn should_only_allow_configured_origins() {
    let app = build_router(offline_state(&["https://admin.x.edu"]));

    let resp = app
        .clone()
        .oneshot(preflight("https://admin.x.edu"))
        .await
        .unwrap();
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "https://admin.x.edu"
    );

    let resp = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(!resp.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn should_add_cors_header_to_simple_responses() {
    let (app, _db) = app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthz")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

// ── Admin guard ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_token() {
    let (app, db) = app().await;

    let resp = app
        .oneshot(request("POST", "/accounts/student", None, Some(jane())))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["kind"], "UNAUTHORIZED");
    assert!(snapshot(&db).await.identities.is_empty());
}

#[tokio::test]
async fn should_forbid_non_admin_token() {
    let (app, _db) = app().await;
    let student = MockAuth::new(IdentityId::generate(), Role::Student);

    let resp = app
        .oneshot(request("GET", "/accounts/student", Some(&student), None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["kind"], "FORBIDDEN");
}

// ── Provisioning ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_full_account_lifecycle() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();

    let resp = app
        .clone()
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(jane())))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["default_password"], "2023000001");
    assert_eq!(created["role"], "student");
    assert_eq!(created["active"], true);
    let id = created["id"].as_str().unwrap().to_owned();

    let resp = app
        .clone()
        .oneshot(request("GET", "/accounts/mahasiswa", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json_body(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(listed[0].get("default_password").is_none());

    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/accounts/student/{id}"),
            Some(&admin),
            Some(json!({
                "email": "jane@x.edu",
                "nim": "2023000001",
                "nama_lengkap": "Jane Doe",
                "angkatan": "2023",
                "is_active": false,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["email"], "jane@x.edu");
    assert_eq!(updated["active"], false);

    let resp = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/accounts/student/{id}"),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["message"], "account deleted");

    let resp = app
        .oneshot(request(
            "GET",
            &format!("/accounts/student/{id}"),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["kind"], "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn should_return_conflict_for_repeated_create() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();
    app.clone()
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(jane())))
        .await
        .unwrap();

    let resp = app
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(jane())))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "DUPLICATE_EMAIL");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn should_name_invalid_field() {
    let (app, db) = app().await;
    let admin = MockAuth::admin();
    let mut body = jane();
    body["student_number"] = json!("123");

    let resp = app
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(body)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "student_number");
    assert!(snapshot(&db).await.identities.is_empty());
}

#[tokio::test]
async fn should_reject_wrongly_typed_body_field_as_validation_error() {
    let (app, db) = app().await;
    let admin = MockAuth::admin();
    let mut body = jane();
    body["enrollment_year"] = json!(2023);

    let resp = app
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(body)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "body");
    assert!(snapshot(&db).await.identities.is_empty());
}

#[tokio::test]
async fn should_reject_non_json_body_as_validation_error() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/student")
                .header("authorization", admin.bearer())
                .header("content-type", "text/plain")
                .body(Body::from("email=a@x.edu"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["field"], "body");

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from("{\"email\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn should_reject_unknown_kind_and_malformed_id() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();

    let resp = app
        .clone()
        .oneshot(request("GET", "/accounts/admin", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["field"], "kind");

    let resp = app
        .oneshot(request("GET", "/accounts/lecturer/42", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["field"], "id");
}

#[tokio::test]
async fn should_create_lecturer_with_legacy_field_names() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();

    let resp = app
        .oneshot(request(
            "POST",
            "/accounts/dosen",
            Some(&admin),
            Some(json!({
                "email": "budi@x.edu",
                "nip": "197801012005011001",
                "nama_lengkap": "Budi Santoso",
                "departemen": "Informatics",
            })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["role"], "lecturer");
    assert_eq!(body["staff_number"], "197801012005011001");
    assert_eq!(body["department"], "Informatics");
    assert_eq!(body["default_password"], "197801012005011001");
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_provisioned_student_login() {
    let (app, _db) = app().await;
    let admin = MockAuth::admin();
    app.clone()
        .oneshot(request("POST", "/accounts/student", Some(&admin), Some(jane())))
        .await
        .unwrap();

    let resp = app
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.edu", "password": "2023000001" })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["kind"], "ACCOUNT_NOT_ACTIVATED");
}

#[tokio::test]
async fn should_let_seeded_admin_sign_in_and_provision() {
    let (app, db) = app().await;
    EnsureAdminUseCase {
        repo: db_repo(&db),
        hasher: fast_hasher(),
    }
    .execute("admin@x.edu", "s3cret")
    .await
    .unwrap();

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "admin@x.edu", "password": "s3cret" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = json_body(resp).await["access_token"]
        .as_str()
        .unwrap()
        .to_owned();

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/accounts/lecturer")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
}
