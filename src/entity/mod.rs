mod note;

pub use note::{ContentType, Note};

use uuid::Uuid;

use crate::error::{PhyslinkError, Result};

/// Longest identifier accepted from a request path.
pub const MAX_NOTE_ID_LENGTH: usize = 128;

/// Generate a fresh note identifier (random UUIDv4, hyphenated lowercase).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that a client-supplied identifier is safe to use as a key and as a
/// storage filename.
pub fn validate_note_id(id: &str) -> Result<()> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_NOTE_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(PhyslinkError::InvalidNoteId(id.to_string()))
    }
}
