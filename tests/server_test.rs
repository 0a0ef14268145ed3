use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use spam_labeler::server::router;
use spam_labeler::{Labeler, LabelerConfig, LearnerConfig};

fn setup() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let emails: Vec<Value> = (0..12)
        .map(|i| json!({"subject": format!("Subject {}", i), "content": format!("Body of email {}", i)}))
        .collect();
    fs::write(dir.path().join("train_docs.json"), serde_json::to_vec(&emails).unwrap()).unwrap();
    fs::write(
        dir.path().join("test_docs.txt"),
        "1 |subject hello |content see you soon\n-1 |subject free |content win money\n",
    )
    .unwrap();

    let config = LabelerConfig {
        learner: LearnerConfig {
            bits: 12,
            ..Default::default()
        },
        ..LabelerConfig::new(dir.path())
    };
    let labeler = Labeler::open(&config).unwrap();
    (dir, router(Arc::new(labeler), None))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_random_emails() {
    let (_dir, app) = setup();
    let (status, body) = send(&app, "GET", "/email", None).await;

    assert_eq!(status, StatusCode::OK);
    let emails = body.as_array().unwrap();
    assert_eq!(emails.len(), 10);
    for email in emails {
        assert!(email["id"].as_u64().unwrap() < 12);
        assert!(email["label"].is_null());
        assert_eq!(email["prediction"].as_f64().unwrap(), 0.5);
    }
}

#[tokio::test]
async fn test_get_email() {
    let (_dir, app) = setup();
    let (status, body) = send(&app, "GET", "/email/3", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 3);
    assert_eq!(body["subject"], "Subject 3");
    assert_eq!(body["content"], "Body of email 3");
}

#[tokio::test]
async fn test_unknown_email_is_404() {
    let (_dir, app) = setup();
    let (status, body) = send(&app, "GET", "/email/12", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("12"));

    let (status, _) = send(&app, "GET", "/email/40/prediction", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_label_roundtrip() {
    let (_dir, app) = setup();

    let (status, body) = send(&app, "GET", "/email/5/label", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 5, "label": ""}));

    let (status, body) = send(&app, "PUT", "/email/5/label", Some(json!({"label": "spam"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 5, "label": "spam"}));

    let (_, body) = send(&app, "GET", "/email/5", None).await;
    assert_eq!(body["label"], "spam");

    let (_, body) = send(&app, "GET", "/email/5/prediction", None).await;
    assert!(body["prediction"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn test_invalid_label_is_400() {
    let (_dir, app) = setup();
    let (status, body) = send(&app, "PUT", "/email/1/label", Some(json!({"label": "maybe"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ham"));

    let (status, body) = send(&app, "PUT", "/email/1/label", Some(json!({"label": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "PUT", "/email/1/label", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("label"));

    let (_, body) = send(&app, "GET", "/email/1/label", None).await;
    assert_eq!(body["label"], "");

    let (_, body) = send(&app, "GET", "/report", None).await;
    assert_eq!(body["count_ham"], 0);
    assert_eq!(body["count_spam"], 0);
}

#[tokio::test]
async fn test_report() {
    let (_dir, app) = setup();
    send(&app, "PUT", "/email/0/label", Some(json!({"label": "ham"}))).await;
    send(&app, "PUT", "/email/1/label", Some(json!({"label": "spam"}))).await;
    send(&app, "PUT", "/email/2/label", Some(json!({"label": "spam"}))).await;

    let (status, body) = send(&app, "GET", "/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count_ham"], 1);
    assert_eq!(body["count_spam"], 2);
    assert!(body["report"].as_str().unwrap().contains("precision"));
}

#[tokio::test]
async fn test_unknown_email_wins_over_bad_label() {
    let (_dir, app) = setup();

    let (status, _) = send(&app, "PUT", "/email/99/label", Some(json!({"label": "bogus"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", "/email/99/label", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
