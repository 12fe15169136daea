#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use assessment_api::{
    config::Config,
    create_router,
    models::{Question, QuestionCatalog, QuestionKind},
    services::AppState,
};

pub fn mc(skill: &str, id: &str, difficulty: f64, correct_option: usize) -> Question {
    Question {
        id: id.to_string(),
        skill: skill.to_string(),
        difficulty,
        prompt: format!("Question {}", id),
        kind: QuestionKind::MultipleChoice {
            options: vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
            correct_option,
        },
        points: 10,
        time_limit_seconds: 60,
    }
}

pub fn open_ended(skill: &str, id: &str, difficulty: f64) -> Question {
    Question {
        id: id.to_string(),
        skill: skill.to_string(),
        difficulty,
        prompt: format!("Explain {}", id),
        kind: QuestionKind::OpenEnded,
        points: 20,
        time_limit_seconds: 300,
    }
}

/// Ten multiple-choice "rust" questions (answer key 0) spanning 1..=10, one
/// open-ended "rust" question, and a single "tiny" question.
pub fn test_catalog() -> QuestionCatalog {
    let mut questions: Vec<Question> = (1..=10)
        .map(|d| mc("rust", &format!("rust-{:02}", d), d as f64, 0))
        .collect();
    questions.push(open_ended("rust", "rust-essay", 5.5));
    questions.push(mc("tiny", "tiny-01", 4.0, 2));
    QuestionCatalog::from_questions(questions).expect("test catalog is valid")
}

pub fn test_state() -> Arc<AppState> {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config {
        metrics_auth: "metrics:secret".to_string(),
        ..Config::default()
    };
    Arc::new(AppState::new(config, test_catalog()))
}

pub fn create_test_app() -> Router {
    create_router(test_state())
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    (status, json)
}
