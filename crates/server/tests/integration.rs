//! Integration tests for the symptom checker.
//!
//! These build the full Axum router with a canned language-model client and
//! drive both form pages, the JSON API and the ops endpoints through
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use symptom_server::ai::{Completer, CompletionError};
use symptom_server::config::Config;
use symptom_server::session::{SESSION_COOKIE, SessionStore};
use symptom_server::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CARDIO_REPLY: &str = "This could be related to strain or reflux.\n\
    Please monitor and seek urgent care if it worsens.\n\
    You should consult with a cardiologist.";

/// Language-model stand-in that plays back canned replies in order.
/// `None` is a failed call; the last entry repeats once the list runs out.
struct StubCompleter {
    replies: Vec<Option<&'static str>>,
    calls: AtomicUsize,
}

impl StubCompleter {
    fn sequence(replies: Vec<Option<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: AtomicUsize::new(0),
        })
    }

    fn replying(text: &'static str) -> Arc<Self> {
        Self::sequence(vec![Some(text)])
    }

    fn failing() -> Arc<Self> {
        Self::sequence(vec![None])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(n)
            .or(self.replies.last())
            .copied()
            .flatten();
        match reply {
            Some(text) => Ok(text.to_string()),
            None => Err(CompletionError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            }),
        }
    }
}

fn test_app(completer: Arc<StubCompleter>) -> Router {
    test_app_with(completer, Config {
        rate_limit_rps: 1000,
        ..Config::default()
    })
}

fn test_app_with(completer: Arc<StubCompleter>, config: Config) -> Router {
    let state = AppState::new(completer, SessionStore::new());
    symptom_server::build_app(state, &config)
}

/// Send a request and return (status, session cookie if set, body text).
async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    (status, cookie, String::from_utf8_lossy(&bytes).into_owned())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Complete step 1 and return the session cookie
async fn start_session(app: &Router, form: &str) -> String {
    let (status, cookie, _) = send(app, post_form("/start", None, form)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    cookie.expect("session cookie should be set")
}

// ---------------------------------------------------------------------------
// Intake flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_visit_shows_step_one_and_sets_cookie() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));

    let (status, cookie, body) = send(&app, get("/", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Step 1 of 2: Basic Information"));
    assert!(body.contains("Your Reliable Symptom Checker"));
    assert!(cookie.unwrap().starts_with(&format!("{SESSION_COOKIE}=")));
}

#[tokio::test]
async fn continue_without_gender_is_rejected() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    let (_, cookie, _) = send(&app, get("/", None)).await;
    let cookie = cookie.unwrap();

    let (status, _, body) = send(&app, post_form("/start", Some(&cookie), "age=34")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please enter your age and select a gender to proceed."));

    let (_, _, body) = send(&app, get("/", Some(&cookie))).await;
    assert!(body.contains("Step 1 of 2"));
}

#[tokio::test]
async fn continue_with_zero_age_is_rejected() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));

    let (status, _, body) = send(&app, post_form("/start", None, "age=0&gender=Male")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("notice-warning"));
    assert!(body.contains("Step 1 of 2"));
}

#[tokio::test]
async fn valid_demographics_move_to_assessment() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    let cookie = start_session(&app, "age=34&gender=Female").await;

    let (status, _, body) = send(&app, get("/", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Step 2 of 2: Symptom Assessment"));
    assert!(body.contains("(Female, aged 34)"));
}

#[tokio::test]
async fn back_keeps_demographics_and_specialist() {
    let stub = StubCompleter::replying(CARDIO_REPLY);
    let app = test_app(stub.clone());
    let cookie = start_session(&app, "age=34&gender=Female").await;

    send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=racing+heart"),
    )
    .await;

    let (status, _, _) = send(&app, post_form("/back", Some(&cookie), "")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, _, body) = send(&app, get("/", Some(&cookie))).await;
    assert!(body.contains("Step 1 of 2"));
    assert!(body.contains(r#"value="34""#));
    assert!(body.contains(r#"value="Female" checked"#));

    let (status, _, _) = send(
        &app,
        post_form("/start", Some(&cookie), "age=34&gender=Female"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, _, body) = send(&app, post_form("/doctors", Some(&cookie), "zip_code=10001")).await;
    assert!(body.contains("https://www.google.com/maps/search/cardiologist+near+10001"));
    assert_eq!(stub.calls(), 1);
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assessment_shows_response_specialist_and_red_flag() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    let cookie = start_session(&app, "age=52&gender=Male").await;

    let (status, _, body) = send(
        &app,
        post_form(
            "/assess",
            Some(&cookie),
            "symptoms=Chest+pain+when+climbing+stairs&category=Pain&category=Fatigue&zip_code=10001",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please seek urgent medical care."));
    assert!(body.contains("This could be related to strain or reflux."));
    assert!(body.contains("You should consult with a cardiologist</em>"));
    assert!(body.contains(r#"value="Pain" checked"#));
    assert!(body.contains("cardiologist+near+10001"));
}

#[tokio::test]
async fn assessment_without_phrase_falls_back_to_primary_care() {
    let app = test_app(StubCompleter::replying("Rest and drink plenty of fluids."));
    let cookie = start_session(&app, "age=29&gender=Other").await;

    let (_, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=runny+nose&zip_code=94110"),
    )
    .await;

    assert!(!body.contains("urgent medical care"));
    assert!(body.contains("You should consult with a primary care physician"));
    assert!(body.contains("primary%20care%20physician+near+94110"));
}

#[tokio::test]
async fn failed_call_shows_error_and_keeps_generic_doctor() {
    let stub = StubCompleter::failing();
    let app = test_app(stub.clone());
    let cookie = start_session(&app, "age=41&gender=Female").await;

    let (status, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=sore+throat"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("⚠️ An error occurred: API error (503): service unavailable"));
    assert!(body.contains("notice-error"));
    assert_eq!(stub.calls(), 1);

    let (_, _, body) = send(&app, post_form("/doctors", Some(&cookie), "zip_code=60601")).await;
    assert!(body.contains("/maps/search/doctor+near+60601"));
}

#[tokio::test]
async fn failed_call_keeps_previous_specialist() {
    let stub = StubCompleter::sequence(vec![Some(CARDIO_REPLY), None]);
    let app = test_app(stub.clone());
    let cookie = start_session(&app, "age=52&gender=Male").await;

    let (_, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=racing+heart"),
    )
    .await;
    assert!(body.contains("You should consult with a cardiologist"));

    let (status, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=still+racing"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("⚠️ An error occurred"));
    assert!(body.contains("You should consult with a cardiologist"));
    assert_eq!(stub.calls(), 2);

    let (_, _, body) = send(&app, post_form("/doctors", Some(&cookie), "zip_code=02139")).await;
    assert!(body.contains("/maps/search/cardiologist+near+02139"));
}

#[tokio::test]
async fn failed_first_call_shows_no_consult_line() {
    let app = test_app(StubCompleter::failing());
    let cookie = start_session(&app, "age=41&gender=Female").await;

    let (_, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=sore+throat"),
    )
    .await;

    assert!(body.contains("notice-error"));
    assert!(!body.contains("You should consult with"));
}

#[tokio::test]
async fn assessment_form_is_rate_limited_as_a_page() {
    let stub = StubCompleter::replying(CARDIO_REPLY);
    let app = test_app_with(
        stub.clone(),
        Config {
            rate_limit_rps: 1,
            ..Config::default()
        },
    );
    let cookie = start_session(&app, "age=29&gender=Other").await;
    let form = "symptoms=dry+cough+at+night&category=Cough&zip_code=73301";

    let (first, _, _) = send(&app, post_form("/assess", Some(&cookie), form)).await;
    assert_eq!(first, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_form("/assess", Some(&cookie), form))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("Too many assessments right now"));
    assert!(body.contains("dry cough at night"));
    assert!(body.contains(r#"value="Cough" checked"#));
    assert!(body.contains(r#"value="73301""#));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn doctors_without_zip_asks_for_one() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    let cookie = start_session(&app, "age=34&gender=Female").await;

    let (status, _, body) = send(&app, post_form("/doctors", Some(&cookie), "zip_code=++")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please enter a ZIP code to search."));
    assert!(!body.contains("/maps/search/"));
}

#[tokio::test]
async fn empty_symptoms_are_rejected_without_a_call() {
    let stub = StubCompleter::replying(CARDIO_REPLY);
    let app = test_app(stub.clone());
    let cookie = start_session(&app, "age=34&gender=Female").await;

    let (status, _, body) = send(
        &app,
        post_form("/assess", Some(&cookie), "symptoms=+++&category=Cough"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please describe your symptoms before proceeding."));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn assessment_before_step_one_redirects() {
    let stub = StubCompleter::replying(CARDIO_REPLY);
    let app = test_app(stub.clone());

    let (status, _, _) = send(&app, post_form("/assess", None, "symptoms=headache")).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn symptom_text_is_escaped_in_page() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    let cookie = start_session(&app, "age=34&gender=Female").await;

    let (_, _, body) = send(
        &app,
        post_form(
            "/assess",
            Some(&cookie),
            "symptoms=%3Cscript%3Ealert(1)%3C%2Fscript%3E",
        ),
    )
    .await;

    assert!(!body.contains("<script>alert(1)"));
    assert!(body.contains("&lt;script&gt;alert(1)"));
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_assess_returns_structured_result() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));

    let (status, cookie, body) = send(
        &app,
        post_json(
            "/api/assess",
            json!({
                "age": 60,
                "gender": "male",
                "symptoms": "shortness of breath",
                "categories": ["Breathing issues"],
                "zip_code": "10001"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_none());
    let body: JsonValue = serde_json::from_str(&body).unwrap();
    assert_eq!(body["red_flag"], true);
    assert_eq!(body["doctor_type"], "cardiologist");
    assert_eq!(body["notices"][0]["level"], "error");
    assert_eq!(
        body["map_link"],
        "https://www.google.com/maps/search/cardiologist+near+10001"
    );
}

#[tokio::test]
async fn api_assess_rejects_invalid_input() {
    let stub = StubCompleter::replying(CARDIO_REPLY);
    let app = test_app(stub.clone());

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/assess",
            json!({"age": 0, "gender": "Female", "symptoms": "cough"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: JsonValue = serde_json::from_str(&body).unwrap();
    assert_eq!(body["level"], "warning");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn api_assess_is_rate_limited() {
    let app = test_app_with(
        StubCompleter::replying(CARDIO_REPLY),
        Config {
            rate_limit_rps: 1,
            ..Config::default()
        },
    );
    let request = || {
        post_json(
            "/api/assess",
            json!({"age": 30, "gender": "Other", "symptoms": "cough"}),
        )
    };

    let (first, _, _) = send(&app, request()).await;
    let (second, _, _) = send(&app, request()).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Ops
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_sessions() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));
    start_session(&app, "age=34&gender=Female").await;

    let (status, cookie, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_none());
    let body: JsonValue = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ai_configured"], true);
    assert_eq!(body["active_sessions"], 1);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app(StubCompleter::replying(CARDIO_REPLY));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}
