//! End-to-end flows against a mock tutor API.
//!
//! The binary runs as a child process, so each invocation is moved onto a
//! blocking thread while the mock server keeps serving on the runtime.

use std::process::Output;

use assert_cmd::Command;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SESSION: &str = r#"{"authToken":"tok-123","saved_at":"2026-01-01T00:00:00Z"}"#;

async fn run(home: &TempDir, server: &MockServer, args: &[&str], stdin: &str) -> Output {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("medboard").unwrap();
    cmd.current_dir(home.path())
        .env("MEDBOARD_HOME", home.path())
        .env("MEDBOARD_API_URL", server.uri())
        .env_remove("MEDBOARD_PASSWORD")
        .args(args)
        .write_stdin(stdin.to_string());

    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn logged_in_home() -> TempDir {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("session.json"), SESSION).unwrap();
    home
}

#[tokio::test(flavor = "multi_thread")]
async fn login_stores_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_string_contains("username=student%40uni.edu"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-123", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = run(
        &home,
        &server,
        &["login", "--email", "student@uni.edu", "--password", "pw"],
        "",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Logged in as student@uni.edu."));
    assert!(stdout(&output).contains("medboard dashboard"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(home.path().join("session.json")).unwrap())
            .unwrap();
    assert_eq!(stored["authToken"], "tok-123");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_login_shows_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = run(
        &home,
        &server,
        &["login", "--email", "student@uni.edu", "--password", "wrong"],
        "",
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Incorrect email or password"));
    assert!(!home.path().join("session.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn signup_prints_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@uni.edu",
            "password": "pw"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = run(
        &home,
        &server,
        &["signup", "--name", "Ada", "--email", "ada@uni.edu", "--password", "pw"],
        "",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Signup successful! You can now log in."));
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_renders_accuracy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("group_by", "body_system"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "performance": [
                {"body_system": "Cardiovascular", "correct_count": 3, "total_answered": 4},
                {"body_system": "Renal", "correct_count": 0, "total_answered": 0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(&home, &server, &["dashboard", "--group-by", "body-system"], "").await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Accuracy by Body System"), "{out}");
    assert!(out.contains("Cardiovascular"));
    assert!(out.contains("75.0%"));
    assert!(out.contains("0.0%"));
}

fn live_data(request: &Request) -> bool {
    !request.url.query_pairs().any(|(key, _)| key == "useTestData")
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_regroups_once_per_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("group_by", "discipline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "performance": [{"discipline": "Cardiology", "correct_count": 1, "total_answered": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("group_by", "specialty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "performance": [{"specialty": "Internal Medicine", "correct_count": 4, "total_answered": 5}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(
        &home,
        &server,
        &["dashboard"],
        ":group specialty\n:group specialty\n:quit\n",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Accuracy by Discipline"));
    assert!(out.contains("Accuracy by Specialty"));
    assert!(out.contains("Internal Medicine"));
    assert!(out.contains("80.0%"));
    assert!(out.contains("Already grouped by Specialty."));
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_toggles_demo_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(live_data)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"performance": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("useTestData", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "performance": [{"group": "Renal", "correct_count": 3, "total_answered": 4}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(&home, &server, &["dashboard"], ":demo on\n:quit\n").await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("No performance data available yet."));
    assert!(out.contains("(demo data)"));
    assert!(out.contains("Renal"));
}

#[tokio::test(flavor = "multi_thread")]
async fn leaving_demo_without_session_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("useTestData", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"performance": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(live_data)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"performance": []})))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = run(&home, &server, &["dashboard", "--demo"], ":demo off\n").await;

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Please log in to see your own results."));
    assert!(stderr(&output).contains("redirecting to /login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn demo_dashboard_works_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/summary"))
        .and(query_param("useTestData", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"performance": []})))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = run(&home, &server, &["dashboard", "--demo"], "").await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No performance data available yet."));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_answers_multiple_choice_question() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/question"))
        .and(query_param("specialty", "Cardiology"))
        .and(query_param("difficulty", "Intermediate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "content": "First-line therapy for stable angina?",
            "options": "A) Nitrates\nB) Beta blockers\nC) Surgery"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/answer"))
        .and(body_json(json!({"question_id": 7, "user_answer": "B"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_correct": true,
            "correct_answer": "B",
            "explanation": "Beta blockers reduce myocardial oxygen demand."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(
        &home,
        &server,
        &["quiz", "--specialty", "Cardiology"],
        "b\n:quit\n",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("First-line therapy for stable angina?"));
    assert!(out.contains("  B) Beta blockers"));
    assert!(out.contains("Feedback: Your answer was correct."));
    assert!(out.contains("Explanation: Beta blockers reduce myocardial oxygen demand."));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_unknown_option_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/question"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "content": "Pick one",
            "options": {"A": "Yes", "B": "No"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_correct": true})))
        .expect(0)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(&home, &server, &["quiz"], "Z\n:quit\n").await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stdout(&output).contains("Feedback:"));
}

#[tokio::test(flavor = "multi_thread")]
async fn bare_topic_command_keeps_current_topic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/question"))
        .and(query_param("specialty", "Cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "content": "Explain preload."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(
        &home,
        &server,
        &["quiz", "--specialty", "Cardiology"],
        ":topic\n:difficulty\n:quit\n",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Usage: :topic <name> (current: Cardiology)"));
    assert!(out.contains("Usage: :difficulty <level> (current: Intermediate)"));
    assert!(!out.contains("Topic: General Medicine"));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_expired_session_clears_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/question"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let home = logged_in_home();
    let output = run(&home, &server, &["quiz"], "").await;

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Authentication failed. Please log in again."));
    assert!(stderr(&output).contains("redirecting to /login"));
    assert!(!home.path().join("session.json").exists());
}
