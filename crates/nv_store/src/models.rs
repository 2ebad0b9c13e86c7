//! Database row models and the decrypted views handed to callers.

use chrono::{DateTime, Utc};
use nv_crypto::CryptoError;
use serde::Serialize;

pub type NoteId = i64;
pub type OwnerId = i64;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteRow {
    pub id: NoteId,
    pub owner_id: OwnerId,
    pub title: String,
    /// Ciphertext token (see `nv_crypto::aead`)
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note with its content decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listed note whose content may have failed to decrypt.
#[derive(Debug)]
pub struct NoteEntry {
    pub id: NoteId,
    pub title: String,
    pub content: Result<String, CryptoError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteEntry {
    pub fn into_note(self) -> Result<Note, (NoteId, CryptoError)> {
        match self.content {
            Ok(content) => Ok(Note {
                id: self.id,
                title: self.title,
                content,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }),
            Err(e) => Err((self.id, e)),
        }
    }
}
