use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::json;

use super::{prepare_text_update, NoteStore, NOTES_TABLE};
use crate::entity::{ContentType, Note};
use crate::error::{PhyslinkError, Result};
use crate::hosted::{check_status, HostedClient};

/// Note store backed by the hosted table service.
pub struct HostedNoteStore {
    client: HostedClient,
}

impl HostedNoteStore {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    fn eq_filter(value: &str) -> String {
        format!("eq.{}", value)
    }

    async fn first_row(response: reqwest::Response) -> Result<Option<Note>> {
        let rows: Vec<Note> = check_status(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[derive(Serialize)]
struct TextPatch<'a> {
    content: &'a str,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl NoteStore for HostedNoteStore {
    async fn get(&self, id: &str) -> Result<Option<Note>> {
        let response = self
            .client
            .request(Method::GET, &self.client.table_url(NOTES_TABLE))
            .query(&[("id", Self::eq_filter(id)), ("select", "*".to_string())])
            .send()
            .await?;

        Self::first_row(response).await
    }

    async fn create(&self, id: &str, content_type: ContentType, content: String) -> Result<Note> {
        let note = Note::new(id, content_type, content)?;

        let response = self
            .client
            .request(Method::POST, &self.client.table_url(NOTES_TABLE))
            .header("Prefer", "return=representation")
            .json(&json!([note]))
            .send()
            .await?;

        // Primary-key conflict: insert-or-fail, same as the SQL backends.
        if response.status() == StatusCode::CONFLICT {
            return Err(PhyslinkError::NoteExists(id.to_string()));
        }

        Self::first_row(response).await?.ok_or_else(|| {
            PhyslinkError::Storage(format!("insert of note {} returned no row", id))
        })
    }

    async fn update_text(&self, id: &str, content: String) -> Result<Note> {
        let updated = prepare_text_update(id, self.get(id).await?, content)?;

        let response = self
            .client
            .request(Method::PATCH, &self.client.table_url(NOTES_TABLE))
            .query(&[
                ("id", Self::eq_filter(id)),
                ("content_type", Self::eq_filter(ContentType::Text.as_str())),
            ])
            .header("Prefer", "return=representation")
            .json(&TextPatch {
                content: &updated.content,
                updated_at: updated.updated_at,
            })
            .send()
            .await?;

        // Nothing matched: the note vanished between the read and the write.
        Self::first_row(response)
            .await?
            .ok_or_else(|| PhyslinkError::NoteNotFound(id.to_string()))
    }
}
