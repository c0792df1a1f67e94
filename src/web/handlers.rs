use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use minijinja::context;
use serde::Deserialize;

use super::templates::render;
use super::{AppState, WebError};
use crate::entity::{generate_id, validate_note_id, ContentType};
use crate::error::PhyslinkError;

/// `GET /` mints a fresh identifier and sends the browser to it.
pub async fn home() -> Response {
    let id = generate_id();
    tracing::debug!(%id, "minted note id");
    (StatusCode::FOUND, [(header::LOCATION, format!("/note/{}", id))]).into_response()
}

/// `GET /note/{id}`: attach form, redirect, or view depending on the note.
pub async fn show_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    validate_note_id(&id)?;

    let Some(note) = state.notes.get(&id).await? else {
        tracing::debug!(%id, "no note attached, showing attach form");
        return Ok(Html(render("attach.html", context! { id => &id })?).into_response());
    };

    tracing::debug!(%id, content_type = %note.content_type, "note found");
    match note.content_type {
        ContentType::Url => {
            let location = HeaderValue::from_str(&note.content).map_err(|_| {
                PhyslinkError::Storage(format!("note {} holds an unusable URL", id))
            })?;
            Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
        }
        ContentType::Text | ContentType::Image => {
            Ok(Html(render("view.html", context! { note => &note })?).into_response())
        }
    }
}

struct Upload {
    filename: String,
    mime: Option<String>,
    bytes: Bytes,
}

/// Fields of the attach form.
#[derive(Default)]
struct Submission {
    content_type: Option<String>,
    content: Option<String>,
    image: Option<Upload>,
}

impl Submission {
    /// Read every field up front; an oversized body fails here, before any
    /// write happens.
    async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "content_type" => submission.content_type = Some(field.text().await?),
                "content" => submission.content = Some(field.text().await?),
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let mime = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked.
                    if !bytes.is_empty() {
                        submission.image = Some(Upload {
                            filename,
                            mime,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(submission)
    }
}

/// `POST /note/{id}`: attach content to an unattached identifier.
pub async fn create_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, WebError> {
    validate_note_id(&id)?;
    let multipart = multipart.map_err(|e| WebError::bad_request(e.body_text()))?;
    let submission = Submission::read(multipart).await?;

    let content_type: ContentType = submission
        .content_type
        .as_deref()
        .unwrap_or_default()
        .parse()?;

    // Attached notes are final; refuse before an upload could replace a file.
    if state.notes.get(&id).await?.is_some() {
        return Err(PhyslinkError::NoteExists(id).into());
    }

    let content = match content_type {
        ContentType::Image => {
            let upload = submission
                .image
                .ok_or_else(|| WebError::bad_request("Image file is required"))?;
            state
                .blobs
                .save(&upload.bytes, &upload.filename, upload.mime.as_deref(), &id)
                .await?
        }
        ContentType::Url | ContentType::Text => submission
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| WebError::bad_request("Content is required"))?,
    };

    let note = state.notes.create(&id, content_type, content).await?;
    tracing::info!(id = %note.id, content_type = %note.content_type, "note created");

    Ok(Html(render("confirmation.html", context! { note => &note })?))
}

#[derive(Debug, Deserialize)]
pub struct TextUpdate {
    #[serde(default)]
    content: String,
}

/// `PUT /note/{id}/text`: replace the text of a text note.
pub async fn update_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<TextUpdate>, FormRejection>,
) -> Result<Redirect, WebError> {
    validate_note_id(&id)?;
    let Form(update) = form?;

    let note = state.notes.update_text(&id, update.content).await?;
    tracing::info!(id = %note.id, "text note updated");

    Ok(Redirect::to(&format!("/note/{}", id)))
}
