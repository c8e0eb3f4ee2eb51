use async_trait::async_trait;
use reqwest::Method;

use super::{check, SupabaseClient};
use crate::error::{PersistError, Result};
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::trait_client::NotesBackend;

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

#[async_trait]
impl NotesBackend for SupabaseClient {
    async fn select_notes(&self, owner: &str) -> Result<Vec<Note>> {
        let response = self
            .rest_request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        let response = self
            .rest_request(Method::POST)
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&[note])
            .send()
            .await?;

        let rows: Vec<Note> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PersistError::Internal("insert returned no rows".to_string()))
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<Note> {
        let response = self
            .rest_request(Method::PATCH)
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .json(patch)
            .send()
            .await?;

        // Row level security hides foreign rows, so both cases look the same
        let rows: Vec<Note> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PersistError::NotFound(id.to_string()))
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let response = self
            .rest_request(Method::DELETE)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
