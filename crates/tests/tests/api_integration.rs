use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vidhi_api::{build_app, ApiConfig};
use vidhi_core::templates::GREETING;

async fn app() -> Router {
    build_app(&ApiConfig::default())
        .await
        .expect("app should build")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, parsed)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_knowledge_stats() {
    let (status, body) = send(app().await, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["knowledge"]["ipc_sections"], 5);
    assert_eq!(body["knowledge"]["crpc_sections"], 4);
    assert_eq!(body["knowledge"]["procedures"], 3);
}

#[tokio::test]
async fn widget_chat_answers_with_response_field() {
    let (status, body) = send(
        app().await,
        post_json("/chat", json!({ "message": "What is Section 302?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = body["response"].as_str().unwrap();
    assert!(response.starts_with("IPC Section 302: Punishment for murder"));
}

#[tokio::test]
async fn widget_chat_rejects_blank_message() {
    let (status, body) = send(app().await, post_json("/chat", json!({ "message": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message is required");
}

#[tokio::test]
async fn chat_tracks_session_history_and_clear() {
    let app = app().await;

    let (status, reply) = send(
        app.clone(),
        post_json("/v1/chat", json!({ "text": "someone tried to cheat me online" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["matched"]["rule"], "scenario");
    assert_eq!(reply["matched"]["family"], "fraud");
    let session_id = reply["session_id"].as_str().unwrap().to_string();

    let (status, history) = send(
        app.clone(),
        get(&format!("/v1/chat/history?session_id={session_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["text"], GREETING);
    assert_eq!(messages[1]["role"], "user");

    let (status, cleared) = send(
        app,
        post_json("/v1/chat/clear", json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_rejects_empty_text() {
    let (status, body) = send(app().await, post_json("/v1/chat", json!({ "text": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_message");
}

#[tokio::test]
async fn section_lookup_and_procedures() {
    let app = app().await;

    let (status, section) = send(app.clone(), get("/v1/sections?code=crpc&number=154")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(section["title"], "Information in cognizable cases");
    assert!(section.get("punishment").is_none());

    let (status, _) = send(app.clone(), get("/v1/sections?code=ipc&number=999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, procedures) = send(app, get("/v1/procedures")).await;
    assert_eq!(status, StatusCode::OK);
    let slugs = procedures
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["slug"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(slugs, ["file_fir", "bail_process", "domestic_violence"]);
}

#[tokio::test]
async fn rate_limit_applies_per_client_but_not_to_health() {
    let config = ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 1,
        ..ApiConfig::default()
    };
    let app = build_app(&config).await.unwrap();

    let first = send(app.clone(), post_json("/chat", json!({ "message": "bail process" }))).await;
    assert_eq!(first.0, StatusCode::OK);

    let second = send(app.clone(), post_json("/chat", json!({ "message": "bail process" }))).await;
    assert_eq!(second.0, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn custom_knowledge_directory_is_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("procedures.json"),
        json!([
            { "slug": "zero_fir", "title": "Zero FIR", "steps": ["Go to any police station", "Ask for a Zero FIR"] }
        ])
        .to_string(),
    )
    .unwrap();

    let config = ApiConfig {
        kb_root: Some(dir.path().to_path_buf()),
        ..ApiConfig::default()
    };
    let app = build_app(&config).await.unwrap();

    let (status, body) = send(app, post_json("/chat", json!({ "message": "what is a zero fir?" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"].as_str().unwrap(),
        "Zero FIR:\n\n1. Go to any police station\n2. Ask for a Zero FIR\n\nPlease note that these are general guidelines. For specific legal advice, please consult a qualified legal professional."
    );
}

#[tokio::test]
async fn widget_chat_matches_on_message_as_typed() {
    let app = app().await;

    for message in ["file\nfir", "ipc  302", "section 304b"] {
        let (status, body) = send(app.clone(), post_json("/chat", json!({ "message": message }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body["response"]
                .as_str()
                .unwrap()
                .starts_with("I understand you're asking about a legal matter."),
            "{message:?}"
        );
    }
}

#[tokio::test]
async fn widget_chat_scenario_note_leads_with_court_line() {
    let (status, body) = send(app().await, post_json("/chat", json!({ "message": "fraud" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().ends_with(
        "4️⃣ Legal Note:\nThe exact punishment is determined by the court based on evidence and circumstances. It is advised to consult a legal expert for a case-specific opinion. For financial frauds, also consider approaching consumer forums or financial regulators."
    ));
}

#[tokio::test]
async fn clearing_unknown_sessions_does_not_grow_the_store() {
    let app = app().await;

    for n in 0..25 {
        let (status, _) = send(
            app.clone(),
            post_json("/v1/chat/clear", json!({ "session_id": format!("made-up-{n}") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, health) = send(app, get("/health")).await;
    assert_eq!(health["active_sessions"], 0);
}
