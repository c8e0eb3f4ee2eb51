use mockito::Matcher;
use serde_json::json;
use smartnotes::config::AppConfig;
use smartnotes::prelude::*;

fn completion(content: Option<&str>) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_summary_round_trip_through_chat_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer gsk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3-8b-8192",
            "messages": [
                {
                    "role": "system",
                    "content": "You are an assistant that summarizes user notes into concise bullet points."
                },
                {
                    "role": "user",
                    "content": "Summarize the following note in markdown format:: milk, eggs"
                }
            ],
            "max_tokens": 300
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(Some("- milk\n- eggs")))
        .create_async()
        .await;

    let workspace = WorkspaceBuilder::new()
        .backend(MemoryBackend::signed_in("ada@example.com"))
        .llm_base_url(server.url())
        .llm_api_key("gsk-test")
        .build()
        .unwrap();

    let note = workspace.create_note("Groceries", "milk, eggs").await.unwrap();
    let summary = workspace.summarize_note(&note).await.unwrap();
    chat.assert_async().await;

    assert_eq!(summary, "- milk\n- eggs");
    assert_eq!(workspace.summary(&note.id).as_deref(), Some("- milk\n- eggs"));
    assert!(!workspace.is_summarizing(&note.id));
}

#[tokio::test]
async fn test_empty_completion_yields_fallback_text() {
    let mut server = mockito::Server::new_async().await;
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(None))
        .create_async()
        .await;

    let workspace = WorkspaceBuilder::new()
        .backend(MemoryBackend::signed_in("ada@example.com"))
        .llm_base_url(server.url())
        .build()
        .unwrap();

    let id = NoteId::new("n1");
    let summary = workspace.summarize(&id, "anything").await.unwrap();
    assert_eq!(summary, "No summary available.");
}

#[tokio::test]
async fn test_null_choices_yield_fallback_text() {
    let mut server = mockito::Server::new_async().await;
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": null, "usage": {"prompt_tokens": 4}}"#)
        .create_async()
        .await;

    let workspace = WorkspaceBuilder::new()
        .backend(MemoryBackend::signed_in("ada@example.com"))
        .llm_base_url(server.url())
        .build()
        .unwrap();

    let id = NoteId::new("n1");
    let summary = workspace.summarize(&id, "anything").await.unwrap();
    assert_eq!(summary, "No summary available.");
    assert_eq!(workspace.summary(&id).as_deref(), Some("No summary available."));
}

#[tokio::test]
async fn test_rejected_key_is_a_summary_failure_only() {
    let mut server = mockito::Server::new_async().await;
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
        .create_async()
        .await;

    let workspace = WorkspaceBuilder::new()
        .backend(MemoryBackend::signed_in("ada@example.com"))
        .llm_base_url(server.url())
        .build()
        .unwrap();
    let note = workspace.create_note("Title", "body").await.unwrap();

    let err = workspace.summarize_note(&note).await.unwrap_err();
    assert!(matches!(err, SummarizeError::Request(ref m) if m.contains("401")));
    assert!(workspace.summary(&note.id).is_none());

    // Editing is unaffected
    let saved = workspace
        .update_note(&note.id, NotePatch::new().content("edited"))
        .await
        .unwrap();
    assert_eq!(saved.content, "edited");
}

#[test]
fn test_builder_from_default_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/default.toml");
    let mut config = AppConfig::from_file(path).unwrap();
    config.supabase_anon_key = "anon".to_string();

    let workspace = WorkspaceBuilder::from_config(&config).build().unwrap();
    assert_eq!(workspace.config(), &config.sync);
}
