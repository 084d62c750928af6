use std::time::Duration;

use mentor_backend::{
    config::CompletionConfig,
    error::Error,
    models::content::{ContentSource, Difficulty, Exercise, GeneratedContent, GenerationRequest},
    models::user::OnboardingData,
    services::{
        completion_service::{CompletionClient, GenerationError, RetryPolicy},
        content_service::ContentService,
    },
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

const COMPLETIONS: &str = "/api/v1/chat/completions";

fn service(server: &MockServer, api_key: Option<&str>) -> ContentService {
    let config = CompletionConfig {
        api_url: format!("{}{}", server.uri(), COMPLETIONS),
        model: "test-model".to_string(),
        api_key: api_key.map(str::to_string),
    };
    let completion = CompletionClient::new(config, reqwest::Client::new()).with_retry_policy(
        RetryPolicy {
            max_attempts: 3,
            backoff_step: Duration::from_millis(5),
        },
    );
    ContentService::new(completion)
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "choices": [{ "message": { "content": content } }] }))
}

#[tokio::test]
async fn exhausted_upstream_falls_back_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let generated = assert_ok!(
        service(&server, Some("key"))
            .lecture("X", Difficulty::Basic, false)
            .await
    );
    assert_eq!(generated.source, ContentSource::Fallback);
    assert_eq!(generated.content.title, "Introduction to X");
}

#[tokio::test]
async fn empty_choices_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .expect(3)
        .mount(&server)
        .await;

    let generated = assert_ok!(service(&server, Some("key")).roadmap("Go").await);
    assert_eq!(generated.source, ContentSource::Fallback);
    assert!(!generated.content.is_empty());
}

#[tokio::test]
async fn short_fenced_lecture_is_replaced_by_fallback() {
    let server = MockServer::start().await;
    let raw = "Here is the JSON: ```json\n{\"title\":\"X\",\"sections\":[{\"title\":\"A\",\"content\":\"short\"}]}\n```";
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(reply(raw))
        .expect(1)
        .mount(&server)
        .await;

    let generated = assert_ok!(
        service(&server, Some("key"))
            .generate(&GenerationRequest::lecture("X", Difficulty::Intermediate, false))
            .await
    );
    assert_eq!(generated.source, ContentSource::Fallback);
    match generated.content {
        GeneratedContent::Lecture(lecture) => assert_eq!(lecture.title, "Introduction to X"),
        other => panic!("expected a lecture, got {:?}", other),
    }
}

#[tokio::test]
async fn roadmap_lines_are_used_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(reply("Step One\n\nStep Two\nStep Three\n"))
        .mount(&server)
        .await;

    let generated = assert_ok!(service(&server, Some("key")).roadmap("Rust").await);
    assert_eq!(generated.source, ContentSource::Generated);
    assert_eq!(generated.content, vec!["Step One", "Step Two", "Step Three"]);
}

#[tokio::test]
async fn partial_quiz_set_is_repaired_and_topped_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(body_string_contains("multiple choice"))
        .respond_with(reply(
            r#"[{"type":"quiz","question":"Q?","options":["A"],"correctAnswer":5}]"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(body_string_contains("coding exercises"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let generated = assert_ok!(
        service(&server, Some("key"))
            .exercises("Rust", Difficulty::Basic, 2, 1)
            .await
    );
    assert_eq!(generated.source, ContentSource::Fallback);
    assert_eq!(generated.content.len(), 3);

    match &generated.content[0] {
        Exercise::Quiz(first) => {
            assert_eq!(first.question, "Q?");
            assert_eq!(first.options, vec!["A", "Option 2", "Option 3", "Option 4"]);
            assert_eq!(first.correct_answer, 0);
        }
        other => panic!("expected a quiz, got {:?}", other),
    }
    assert!(matches!(generated.content[2], Exercise::Coding(_)));
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let err = assert_err!(
        service(&server, None)
            .lecture("Rust", Difficulty::Basic, true)
            .await
    );
    assert!(matches!(err, Error::Generation(GenerationError::MissingApiKey)));
}

#[tokio::test]
async fn topic_recommendations_retry_with_simple_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(body_string_contains("Suggest 3 specific topics"))
        .respond_with(reply("I would suggest learning more."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(body_string_contains("Suggest 2 learning topics about Python"))
        .respond_with(reply(
            r#"[{"title":"Python Basics","description":"Syntax and types","duration":"2 weeks"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let profile = OnboardingData {
        interests: vec!["Python".to_string()],
        ..OnboardingData::anonymous()
    };
    let generated = assert_ok!(
        service(&server, Some("key"))
            .recommended_topics(&profile)
            .await
    );
    assert_eq!(generated.source, ContentSource::Generated);
    assert_eq!(generated.content[0].title, "Python Basics");
}
