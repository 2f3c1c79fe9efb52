//! Relay HTTP contract tests over a real listener

mod common;

use relaychat_llm::mock::MockOutcome;
use relaychat_llm::ProviderReply;
use serde_json::{json, Value};

use crate::common::TestRelay;

async fn post_ask(relay: &TestRelay, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(relay.ask_url())
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[test_log::test(tokio::test)]
async fn test_ask_returns_provider_text() {
    let relay = TestRelay::start_with(MockOutcome::Reply(ProviderReply::CandidatePart(
        "hi there".to_string(),
    )))
    .await
    .unwrap();

    let (status, body) = post_ask(&relay, json!({"prompt": "hello"})).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"reply": "hi there"}));
    assert_eq!(relay.mock.recorded_requests()[0].prompt, "hello");
}

#[tokio::test]
async fn test_ask_empty_prompt_is_rejected() {
    let relay = TestRelay::start().await.unwrap();

    let (status, body) = post_ask(&relay, json!({"prompt": ""})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Prompt is required"}));
    assert!(relay.mock.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_ask_missing_prompt_is_rejected() {
    let relay = TestRelay::start().await.unwrap();

    let (status, body) = post_ask(&relay, json!({"text": "hello"})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Prompt is required"}));
}

#[tokio::test]
async fn test_ask_without_body_is_missing_prompt() {
    let relay = TestRelay::start().await.unwrap();

    let resp = reqwest::Client::new()
        .post(relay.ask_url())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Prompt is required"})
    );
    assert!(relay.mock.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_ask_non_string_prompt_is_rejected() {
    let relay = TestRelay::start().await.unwrap();

    let (status, body) = post_ask(&relay, json!({"prompt": 42})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Prompt must be a string"}));
    assert!(relay.mock.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_ask_provider_failure_is_generic_500() {
    let relay = TestRelay::start_with(MockOutcome::Fail("upstream exploded".to_string()))
        .await
        .unwrap();

    let (status, body) = post_ask(&relay, json!({"prompt": "hello"})).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Something went wrong."}));
}

#[tokio::test]
async fn test_ask_without_extractable_text_returns_placeholder() {
    let relay = TestRelay::start_with(MockOutcome::Reply(ProviderReply::Unrecognized(
        json!({"promptFeedback": {"blockReason": "SAFETY"}}),
    )))
    .await
    .unwrap();

    let (status, body) = post_ask(&relay, json!({"prompt": "hello"})).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"reply": "No response text (see server logs)"}));
}

#[tokio::test]
async fn test_each_ask_makes_one_provider_call() {
    let relay = TestRelay::start().await.unwrap();

    for prompt in ["one", "two", "three"] {
        let (status, body) = post_ask(&relay, json!({ "prompt": prompt })).await;
        assert_eq!(status, 200);
        assert_eq!(body["reply"], format!("Mock response to: {}", prompt));
    }

    assert_eq!(relay.mock.recorded_requests().len(), 3);
}

#[tokio::test]
async fn test_health_endpoint() {
    let relay = TestRelay::start().await.unwrap();

    let resp = reqwest::get(format!("{}/health", relay.base_url()))
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}
