use nv_crypto::{CryptoError, KeyError};
use thiserror::Error;

use crate::models::NoteId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Note #{note_id} could not be decrypted with the current key: {source}")]
    Decryption {
        note_id: NoteId,
        #[source]
        source: CryptoError,
    },

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// True when the key file was absent at load time.
    pub fn is_key_missing(&self) -> bool {
        matches!(self, StoreError::Key(KeyError::KeyMissing { .. }))
    }
}
