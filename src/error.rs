use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhyslinkError {
    #[error("Invalid content type: '{0}'. Valid types: url, text, image")]
    InvalidContentType(String),

    #[error("Invalid note identifier: '{0}'")]
    InvalidNoteId(String),

    #[error("{0}")]
    Validation(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Note already exists: {0}")]
    NoteExists(String),

    #[error("File size too large. Maximum size is {max_mb}MB.")]
    PayloadTooLarge { max_mb: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Hosted service error ({status}): {message}")]
    Hosted { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("QR encoding error: {0}")]
    Qr(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

pub type Result<T> = std::result::Result<T, PhyslinkError>;
