//! Same flow as `notes-session`, against the in-memory backend.
//! Summaries still go to the configured chat endpoint when GROQ_API_KEY is set.

use anyhow::Result;
use smartnotes::persist::{FailPoint, PersistError};
use smartnotes::prelude::*;
use smartnotes::{LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging(&LoggingConfig {
        level: "smartnotes_sync=debug,info".to_string(),
        format: LogFormat::Pretty,
    })?;

    let backend = MemoryBackend::signed_in("demo@example.com");
    let workspace = WorkspaceBuilder::new()
        .backend(backend.clone())
        .llm_api_key(std::env::var("GROQ_API_KEY").unwrap_or_default())
        .build()?;
    let mut events = workspace.subscribe();

    for (title, content) in [
        ("", "Call the dentist before noon"),
        ("Reading list", "Rust for Rustaceans, Designing Data-Intensive Applications"),
        ("Meeting notes", "Ship the sync layer; review cache invalidation"),
    ] {
        let note = workspace.create_note(title, content).await?;
        tracing::info!(note_id = %note.id, title = %note.title, "created");
    }

    let notes = workspace.notes().await?;
    println!("{} notes, newest first:", notes.len());
    for note in notes.iter() {
        println!("  - {}: {}", note.display_title(), note.display_content());
    }

    let hits = workspace.search("rust").await?;
    println!("\nSearch \"rust\": {} match(es)", hits.len());

    if let Some(first) = notes.first() {
        match workspace.summarize_note(first).await {
            Ok(summary) => println!("\nSummary of {}:\n{}", first.display_title(), summary),
            Err(e) => println!("\nNo summary ({}); notes are unaffected", e),
        }
    }

    // Injected failure leaves the list intact
    backend.fail_next(
        FailPoint::Delete,
        PersistError::Internal("simulated outage".to_string()),
    );
    if let Some(last) = notes.last() {
        if let Err(e) = workspace.delete_note(&last.id).await {
            println!("\nDelete failed: {}", e);
        }
    }
    println!("Still {} notes", workspace.notes().await?.len());

    while let Ok(event) = events.try_recv() {
        tracing::debug!(?event, "sync event");
    }
    Ok(())
}
