//! End-to-end chat flows: ChatSession → HttpRelayClient → relay → mock provider

mod common;

use std::time::Duration;

use relaychat_conversations::{
    ChatSession, Message, MessageId, MessageStatus, RelayError, RelayService, SessionError,
    ERROR_TEXT,
};
use relaychat_llm::mock::MockOutcome;
use relaychat_llm::ProviderReply;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

use crate::common::TestRelay;

async fn settled(session: &ChatSession, id: MessageId) -> Message {
    timeout(Duration::from_secs(5), session.wait_for(id))
        .await
        .expect("reply did not settle")
        .unwrap()
}

fn fixed_reply(text: &str) -> MockOutcome {
    MockOutcome::Reply(ProviderReply::TopLevelText(text.to_string()))
}

#[test_log::test(tokio::test)]
async fn test_hello_resolves_to_done() {
    let relay = TestRelay::start_with(fixed_reply("hi there")).await.unwrap();
    let session = relay.session();

    let (_, bot) = session.submit("hello").await.unwrap();
    let done = settled(&session, bot.id).await;

    assert_eq!(done.status, Some(MessageStatus::Done));
    assert_eq!(done.text, "hi there");
    assert_eq!(done.original_prompt.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_server_error_marks_reply_failed() {
    let relay = TestRelay::start_with(MockOutcome::Fail("down".to_string()))
        .await
        .unwrap();
    let session = relay.session();

    let (_, bot) = session.submit("hello").await.unwrap();
    let failed = settled(&session, bot.id).await;

    assert_eq!(failed.status, Some(MessageStatus::Error));
    assert_eq!(failed.text, ERROR_TEXT);
}

#[tokio::test]
async fn test_retry_after_recovery_resends_original_prompt() {
    let relay = TestRelay::start_with(MockOutcome::Fail("down".to_string()))
        .await
        .unwrap();
    let session = relay.session();

    let (user, bot) = session.submit("X").await.unwrap();
    settled(&session, bot.id).await;

    relay.mock.set_outcome(MockOutcome::Echo);
    let (_, other) = session.submit("something else").await.unwrap();
    settled(&session, other.id).await;

    assert_ok!(session.retry_for_user(user.id).await);
    let done = settled(&session, bot.id).await;

    assert_eq!(done.status, Some(MessageStatus::Done));
    assert_eq!(done.text, "Mock response to: X");

    let prompts: Vec<String> = relay
        .mock
        .recorded_requests()
        .into_iter()
        .map(|r| r.prompt)
        .collect();
    assert_eq!(prompts, vec!["X", "something else", "X"]);
}

#[tokio::test]
async fn test_blank_prompt_never_reaches_relay() {
    let relay = TestRelay::start().await.unwrap();
    let session = relay.session();

    assert_eq!(session.submit("   ").await, Err(SessionError::EmptyPrompt));

    assert!(session.snapshot().await.is_empty());
    assert!(relay.mock.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_conversation_order_and_ids() {
    let relay = TestRelay::start().await.unwrap();
    let session = relay.session();

    for prompt in ["a", "b"] {
        let (_, bot) = session.submit(prompt).await.unwrap();
        settled(&session, bot.id).await;
    }

    let messages = session.snapshot().await;
    let ids: Vec<u64> = messages.iter().map(|m| m.id.0).collect();
    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();

    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(
        texts,
        vec!["a", "Mock response to: a", "b", "Mock response to: b"]
    );
}

#[tokio::test]
async fn test_unreachable_relay_is_network_error() {
    let relay = TestRelay::start().await.unwrap();
    let client = relay.client();
    drop(relay);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = assert_err!(client.send("hello").await);
    assert!(matches!(err, RelayError::Network(_)));
}
