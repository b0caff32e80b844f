//! Full-stack tests over the assembled router with in-memory stores and
//! scripted outbound clients.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::Secret;
use soma_adapters::{
    InMemoryAccountStore, InMemoryAttendanceStore, InMemoryDraftStore, InMemorySubscriberStore,
    MockEmailClient, MockVerificationClient,
};
use soma_axum::AppState;
use soma_core::{
    AccountStore, EmailAddress, NewAccount, Password, PhoneNumber, RoleDetails, Username,
};
use soma_school_service::SchoolService;
use tower::ServiceExt;

const SIGNING_KEY: &str = "end-to-end-signing-key";
const ACCEPTED_CODE: &str = "123456";
const TEST_PASSWORD: &str = "somaSOMA123";

struct TestApp {
    router: Router,
    account_store: InMemoryAccountStore,
    email_client: MockEmailClient,
}

fn test_app() -> TestApp {
    let attendance_store = InMemoryAttendanceStore::new();
    let account_store = InMemoryAccountStore::new(attendance_store.clone());
    let email_client = MockEmailClient::new();

    let state = AppState {
        account_store: Arc::new(account_store.clone()),
        attendance_store: Arc::new(attendance_store),
        subscriber_store: Arc::new(InMemorySubscriberStore::new()),
        draft_store: Arc::new(InMemoryDraftStore::new()),
        email_client: Arc::new(email_client.clone()),
        verification_client: Arc::new(MockVerificationClient::accepting(ACCEPTED_CODE)),
        signing_key: Secret::from(SIGNING_KEY.to_owned()),
        session_ttl_seconds: 3600,
        reset_ttl_seconds: 600,
        base_url: "http://127.0.0.1:3000".to_owned(),
    };

    TestApp {
        router: SchoolService::new(state).into_router(),
        account_store,
        email_client,
    }
}

async fn post_form(
    app: &TestApp,
    path: &str,
    body: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.router
        .clone()
        .oneshot(builder.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &TestApp, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// First `name=value` pair from the response's Set-Cookie headers, ready to
/// send back in a Cookie header.
fn cookie_pair(response: &axum::response::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let pair = raw.split(';').next()?.trim();
            let (n, _) = pair.split_once('=')?;
            (n == name).then(|| pair.to_owned())
        })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed_account(app: &TestApp, username: &str, email: &str, details: RoleDetails) {
    let account = NewAccount {
        first_name: "Seed".to_owned(),
        last_name: "Account".to_owned(),
        username: Username::try_from(username).unwrap(),
        email: EmailAddress::try_from(email).unwrap(),
        phone_number: PhoneNumber::try_from("+254700999888").unwrap(),
        verification_phone: None,
        password: Password::try_from(TEST_PASSWORD.to_owned()).unwrap(),
        details,
    };
    app.account_store.add_account(account).await.unwrap();
}

async fn login(app: &TestApp, username: &str, password: &str) -> Option<String> {
    let response = post_form(
        app,
        "/login",
        &format!("username={username}&password={password}"),
        None,
    )
    .await;
    cookie_pair(&response, "session")
}

async fn admin_session(app: &TestApp) -> String {
    seed_account(
        app,
        "head_admin",
        "admin@somasoma.co.ke",
        RoleDetails::Admin {
            residence: "Nairobi".to_owned(),
            department: "Operations".to_owned(),
        },
    )
    .await;
    login(app, "head_admin", TEST_PASSWORD).await.unwrap()
}

async fn confirmed_subscriber(app: &TestApp, email: &str) {
    let response = post_form(
        app,
        "/newsletter/subscribe",
        &format!("email={email}"),
        None,
    )
    .await;
    let pending = cookie_pair(&response, "pending_subscriber").unwrap();

    let response = post_form(
        app,
        "/newsletter/confirm",
        &format!("code={ACCEPTED_CODE}"),
        Some(&pending),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn parent_registers_logs_in_and_resets_password() {
    let app = test_app();

    let response = post_form(
        &app,
        "/register/parent",
        "first_name=Jane&last_name=Doe&username=jdoe&email=jdoe@example.com\
         &phone_number=%2B254700111222&password=somaSOMA123&confirm_password=somaSOMA123\
         &residence=Nairobi",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let session = login(&app, "jdoe", TEST_PASSWORD).await;
    assert!(session.is_some());

    let response = post_form(
        &app,
        "/password-reset/request",
        "email=jdoe@example.com",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let sent = app.email_client.sent_emails().await;
    let reset_email = sent.last().unwrap();
    let token = reset_email
        .text_body
        .split("/password-reset/")
        .nth(1)
        .unwrap()
        .split_whitespace()
        .next()
        .unwrap();

    let response = post_form(
        &app,
        &format!("/password-reset/{token}"),
        "password=newsomaSOMA456&confirm_password=newsomaSOMA456",
        None,
    )
    .await;
    assert_eq!(location(&response), "/login");

    // The old password no longer works, the new one does.
    assert!(login(&app, "jdoe", TEST_PASSWORD).await.is_none());
    assert!(login(&app, "jdoe", "newsomaSOMA456").await.is_some());
}

#[tokio::test]
async fn unknown_user_and_wrong_password_answer_identically() {
    let app = test_app();
    seed_account(
        &app,
        "jdoe",
        "jdoe@example.com",
        RoleDetails::Parent {
            residence: "Nairobi".to_owned(),
        },
    )
    .await;

    let wrong_password = post_form(&app, "/login", "username=jdoe&password=wrongPASS1", None).await;
    let unknown_user = post_form(&app, "/login", "username=ghost&password=wrongPASS1", None).await;

    assert_eq!(wrong_password.status(), unknown_user.status());
    assert_eq!(location(&wrong_password), location(&unknown_user));
    assert!(cookie_pair(&wrong_password, "session").is_none());
    assert!(cookie_pair(&unknown_user, "session").is_none());
}

#[tokio::test]
async fn used_reset_link_no_longer_resolves_to_a_session_change() {
    let app = test_app();
    seed_account(
        &app,
        "jdoe",
        "jdoe@example.com",
        RoleDetails::Parent {
            residence: "Nairobi".to_owned(),
        },
    )
    .await;

    // Unknown address answers the same way as a known one and sends nothing.
    let response = post_form(
        &app,
        "/password-reset/request",
        "email=ghost@example.com",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(app.email_client.sent_emails().await.is_empty());

    // A garbage token reads as an expired link.
    let response = post_form(
        &app,
        "/password-reset/not-a-token",
        "password=newsomaSOMA456&confirm_password=newsomaSOMA456",
        None,
    )
    .await;
    assert_eq!(location(&response), "/login");
    assert!(login(&app, "jdoe", "newsomaSOMA456").await.is_none());
}

#[tokio::test]
async fn newsletter_signup_requires_the_verification_code() {
    let app = test_app();

    let response = post_form(&app, "/newsletter/subscribe", "email=a@b.com", None).await;
    let pending = cookie_pair(&response, "pending_subscriber").unwrap();

    let response = post_form(
        &app,
        "/newsletter/confirm",
        "code=000000",
        Some(&pending),
    )
    .await;
    assert_eq!(location(&response), "/newsletter/confirm");

    let response = post_form(
        &app,
        "/newsletter/confirm",
        &format!("code={ACCEPTED_CODE}"),
        Some(&pending),
    )
    .await;
    assert_eq!(location(&response), "/");

    // Thank-you email went out to the confirmed address.
    let sent = app.email_client.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients[0].as_str(), "a@b.com");
}

#[tokio::test]
async fn drip_stage_reaches_a_subscriber_once() {
    let app = test_app();
    confirmed_subscriber(&app, "a@b.com").await;
    let admin = admin_session(&app).await;

    let baseline = app.email_client.sent_emails().await.len();

    let response = post_form(&app, "/admin/newsletter/stage/1", "", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.email_client.sent_emails().await.len(), baseline + 1);

    // The counter now reads as served, so later stages skip this subscriber.
    post_form(&app, "/admin/newsletter/stage/2", "", Some(&admin)).await;
    assert_eq!(app.email_client.sent_emails().await.len(), baseline + 1);
}

#[tokio::test]
async fn attendance_is_teacher_only_and_per_teacher() {
    let app = test_app();

    let response = get(&app, "/attendance", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    seed_account(
        &app,
        "mr_otieno",
        "otieno@somasoma.co.ke",
        RoleDetails::Teacher {
            course: "Scratch".to_owned(),
            residence: "Nairobi".to_owned(),
        },
    )
    .await;
    let teacher = login(&app, "mr_otieno", TEST_PASSWORD).await.unwrap();

    // Teacher sessions stop at the admin tree.
    let response = get(&app, "/admin/accounts/teacher", Some(&teacher)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_form(
        &app,
        "/attendance",
        "student_first_name=Amani&program=Scratch&cohort=2025A&program_schedule=Saturday\
         &lesson_number=3&hours=2&lesson_date=2025-06-14",
        Some(&teacher),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = get(&app, "/attendance", Some(&teacher)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let records = json_body(response).await;
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["student_first_name"], "Amani");
}

#[tokio::test]
async fn draft_must_be_allowed_before_dispatch_and_dispatches_once() {
    let app = test_app();
    confirmed_subscriber(&app, "a@b.com").await;
    let admin = admin_session(&app).await;

    let response = post_form(
        &app,
        "/admin/emails",
        "subject=Term+Dates&body=Term+starts+May+5th.&closing=Kind+Regards\
         &signature=somaSOMA&bulk_category=subscribers",
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = get(&app, "/admin/emails", Some(&admin)).await;
    let drafts = json_body(response).await;
    let id = drafts[0]["id"].as_str().unwrap().to_owned();
    assert_eq!(drafts[0]["allow_send"], false);

    let baseline = app.email_client.sent_emails().await.len();

    // Locked drafts do not go out.
    post_form(&app, &format!("/admin/emails/{id}/dispatch"), "", Some(&admin)).await;
    assert_eq!(app.email_client.sent_emails().await.len(), baseline);

    post_form(&app, &format!("/admin/emails/{id}/allow"), "", Some(&admin)).await;
    post_form(&app, &format!("/admin/emails/{id}/dispatch"), "", Some(&admin)).await;

    let sent = app.email_client.sent_emails().await;
    assert_eq!(sent.len(), baseline + 1);
    assert_eq!(sent.last().unwrap().subject, "Term Dates");

    // Dispatch is once only.
    post_form(&app, &format!("/admin/emails/{id}/dispatch"), "", Some(&admin)).await;
    assert_eq!(app.email_client.sent_emails().await.len(), baseline + 1);

    let response = get(&app, &format!("/admin/emails/{id}"), Some(&admin)).await;
    let draft = json_body(response).await;
    assert!(!draft["dispatched_at"].is_null());
}

#[tokio::test]
async fn admin_can_deactivate_and_reactivate_an_account() {
    let app = test_app();
    let admin = admin_session(&app).await;
    seed_account(
        &app,
        "jdoe",
        "jdoe@example.com",
        RoleDetails::Parent {
            residence: "Nairobi".to_owned(),
        },
    )
    .await;

    let response = get(&app, "/admin/accounts/parent", Some(&admin)).await;
    let parents = json_body(response).await;
    let id = parents[0]["id"].as_str().unwrap().to_owned();

    post_form(
        &app,
        &format!("/admin/accounts/{id}/deactivate"),
        "",
        Some(&admin),
    )
    .await;
    assert!(login(&app, "jdoe", TEST_PASSWORD).await.is_none());

    post_form(
        &app,
        &format!("/admin/accounts/{id}/activate"),
        "",
        Some(&admin),
    )
    .await;
    assert!(login(&app, "jdoe", TEST_PASSWORD).await.is_some());
}
