// src/entity/note.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PhyslinkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Url,
    Text,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Url => "url",
            ContentType::Text => "text",
            ContentType::Image => "image",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = PhyslinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(ContentType::Url),
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            _ => Err(PhyslinkError::InvalidContentType(s.to_string())),
        }
    }
}

/// Content attached to a physical hyperlink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content_type: ContentType,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a fully populated note, validating content for its type.
    pub fn new(id: impl Into<String>, content_type: ContentType, content: String) -> Result<Self> {
        validate_content(content_type, &content)?;

        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            content_type,
            content,
            created_at: now,
            updated_at: now,
        })
    }

    /// Return this note with its text replaced. Only text notes can change.
    pub fn with_text(mut self, content: String) -> Result<Self> {
        if self.content_type != ContentType::Text {
            return Err(PhyslinkError::Validation(
                "Only text notes can be edited".to_string(),
            ));
        }
        validate_content(ContentType::Text, &content)?;

        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        self.content = content;
        Ok(self)
    }
}

fn validate_content(content_type: ContentType, content: &str) -> Result<()> {
    match content_type {
        ContentType::Text => {
            if content.trim().is_empty() {
                return Err(PhyslinkError::Validation("Content is required".to_string()));
            }
        }
        ContentType::Url => {
            if content.trim().is_empty() {
                return Err(PhyslinkError::Validation("Content is required".to_string()));
            }
            // Stored verbatim and later sent as a Location header.
            let web_url = reqwest::Url::parse(content)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if content.chars().any(char::is_control) || !web_url {
                return Err(PhyslinkError::Validation(format!(
                    "Invalid URL: {}",
                    content
                )));
            }
        }
        ContentType::Image => {
            if content.is_empty() {
                return Err(PhyslinkError::Storage(
                    "Image upload produced no URL".to_string(),
                ));
            }
        }
    }
    Ok(())
}
