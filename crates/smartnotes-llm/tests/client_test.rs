use mockito::Matcher;
use serde_json::json;
use smartnotes_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient};

fn client_for(server: &mockito::Server, key: &str) -> OpenAIClient {
    OpenAIClient::builder()
        .api_key(key)
        .base_url(server.url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_chat_sends_openai_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3-8b-8192",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"}
            ],
            "temperature": 0.7,
            "max_tokens": 300
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "- hello"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server, "test-key");
    let request = ChatRequest::new(
        "llama3-8b-8192",
        vec![Message::system("sys"), Message::human("hello")],
    )
    .with_options(ChatOptions::new().temperature(0.7).max_tokens(300));

    let response = client.chat(request).await.unwrap();
    mock.assert_async().await;

    assert_eq!(response.content.as_deref(), Some("- hello"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn test_chat_without_choices_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = client_for(&server, "test-key");
    let response = client
        .chat(ChatRequest::new("m", vec![Message::human("x")]))
        .await
        .unwrap();

    assert!(response.content.is_none());
    assert!(response.usage.is_none());
}

async fn chat_with_body(body: &str) -> smartnotes_llm::ChatResponse {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    client_for(&server, "test-key")
        .chat(ChatRequest::new("m", vec![Message::human("x")]))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_chat_null_choices_is_empty_completion() {
    let response = chat_with_body(r#"{"choices": null}"#).await;
    assert!(response.content.is_none());
    assert!(response.finish_reason.is_none());
}

#[tokio::test]
async fn test_chat_null_choice_entry_is_empty_completion() {
    let response = chat_with_body(r#"{"choices": [null]}"#).await;
    assert!(response.content.is_none());
}

#[tokio::test]
async fn test_chat_keeps_content_when_usage_is_incomplete() {
    let response = chat_with_body(
        r#"{"choices": [{"message": {"content": "- kept"}, "finish_reason": "stop"}], "usage": {"total_tokens": 9}}"#,
    )
    .await;

    assert_eq!(response.content.as_deref(), Some("- kept"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn test_chat_error_status_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Invalid API Key"}}"#)
        .create_async()
        .await;

    // Missing key is not validated locally, the endpoint rejects it
    let client = client_for(&server, "");
    let err = client
        .chat(ChatRequest::new("m", vec![Message::human("x")]))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("401"), "unexpected error: {msg}");
    assert!(msg.contains("Invalid API Key"));
}
