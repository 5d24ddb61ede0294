//! Telegram delivery tests against a mock Bot API.

mod common;

use common::{MockServer, BROKEN_CHAT, TEST_TOKEN};
use newsrelay::{Publisher, RelayError, TelegramChannel};

#[tokio::test]
async fn test_send_message_payload() {
    let server = MockServer::start().await;
    let channel = TelegramChannel::new(reqwest::Client::new(), server.url(""), TEST_TOKEN, "@news");

    channel.publish("<b>Hello</b>").await.unwrap();

    let messages = server.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["chat_id"], "@news");
    assert_eq!(messages[0]["text"], "<b>Hello</b>");
    assert_eq!(messages[0]["parse_mode"], "HTML");
    assert_eq!(messages[0]["disable_web_page_preview"], true);
}

#[tokio::test]
async fn test_send_message_api_error_description() {
    let server = MockServer::start().await;
    let channel =
        TelegramChannel::new(reqwest::Client::new(), server.url(""), TEST_TOKEN, BROKEN_CHAT);

    let result = channel.publish("hello").await;
    match result {
        Err(RelayError::Delivery(msg)) => {
            assert!(msg.contains("chat not found"));
            assert!(msg.contains(BROKEN_CHAT));
        }
        other => panic!("Expected Delivery error, got {other:?}"),
    }
    assert!(server.messages().is_empty());
}

#[tokio::test]
async fn test_send_message_bad_token() {
    let server = MockServer::start().await;
    let channel = TelegramChannel::new(reqwest::Client::new(), server.url(""), "0:wrong", "@news");

    let result = channel.publish("hello").await;
    match result {
        Err(RelayError::Delivery(msg)) => assert!(msg.contains("Unauthorized")),
        other => panic!("Expected Delivery error, got {other:?}"),
    }
}
