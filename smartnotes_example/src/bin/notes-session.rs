use anyhow::{Context, Result};
use chrono::Utc;
use smartnotes::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    let email = std::env::var("SMARTNOTES_DEMO_EMAIL")
        .context("SMARTNOTES_DEMO_EMAIL is required for the scripted session")?;
    let password = std::env::var("SMARTNOTES_DEMO_PASSWORD")
        .context("SMARTNOTES_DEMO_PASSWORD is required for the scripted session")?;

    println!("SmartNotes - Scripted Session");
    println!("=============================\n");

    println!("1. Connecting to {}...", config.supabase.url);
    let workspace = Arc::new(WorkspaceBuilder::from_config(&config).build()?);
    let _listener = workspace.spawn_auth_listener();

    let user = workspace.sign_in(&email, &password).await?;
    println!("   ✓ Signed in as {}\n", user.email.as_deref().unwrap_or(&user.id));

    println!("2. Creating a note...");
    let ticket = workspace.open_new_note();
    workspace.edit_open_note(
        ticket,
        "Weekly groceries",
        "Milk, eggs, sourdough bread, two lemons, coffee beans, something for dinner on Friday",
    );
    let note = workspace.save_open_note().await?;
    println!("   ✓ Created {} ({})\n", note.display_title(), note.id);

    println!("3. Listing notes...");
    let now = Utc::now();
    for note in workspace.notes().await?.iter() {
        println!(
            "   - {} · {}",
            note.display_title(),
            relative_time(note.updated_at, now)
        );
    }
    println!();

    println!("4. Searching for \"MILK\"...");
    let hits = workspace.search("MILK").await?;
    println!("   ✓ {} match(es)\n", hits.len());

    println!("5. Summarizing...");
    match workspace.summarize_note(&note).await {
        Ok(summary) => println!("{}\n", summary),
        Err(e) => println!("   ✗ Summary unavailable: {}\n", e),
    }

    println!("6. Renaming...");
    let renamed = workspace
        .update_note(&note.id, NotePatch::new().title("Groceries (this week)"))
        .await?;
    println!("   ✓ Now titled {}\n", renamed.display_title());

    println!("7. Cleaning up...");
    workspace.delete_note(&note.id).await?;
    workspace.sign_out().await?;
    println!("   ✓ Deleted note and signed out\n");

    println!("=============================");
    println!("Session completed successfully!");
    Ok(())
}
