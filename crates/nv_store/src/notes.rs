//! Note CRUD, scoped by owner.
//!
//! Each operation is a single SQL statement.  `owner_id` is part of every
//! predicate, so a note id on its own never selects a row.

use chrono::Utc;
use tracing::{debug, warn};

use crate::db::{aad_for, Store};
use crate::error::StoreError;
use crate::models::{Note, NoteEntry, NoteId, NoteRow, OwnerId};

impl Store {
    /// Encrypt `content` and insert a new note.  Returns the assigned id.
    ///
    /// The key is obtained before anything is written, so a missing key
    /// leaves the table untouched.
    pub async fn add(
        &self,
        owner_id: OwnerId,
        title: &str,
        content: &str,
    ) -> Result<NoteId, StoreError> {
        let content_enc = self.encrypt_content(owner_id, content).await?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO notes (owner_id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(title)
        .bind(&content_enc)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let note_id = result.last_insert_rowid();
        debug!(owner_id, note_id, "note added");
        Ok(note_id)
    }

    /// All notes of `owner_id`, ascending by id, with content decrypted.
    ///
    /// Fails with [`StoreError::Decryption`] on the first row that does not
    /// decrypt under the current key.  Use [`Store::list_entries`] to handle
    /// such rows one by one instead.
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Note>, StoreError> {
        self.list_entries(owner_id)
            .await?
            .into_iter()
            .map(|entry| {
                entry
                    .into_note()
                    .map_err(|(note_id, source)| StoreError::Decryption { note_id, source })
            })
            .collect()
    }

    /// Like [`Store::list`], but a row that fails to decrypt is reported in
    /// its own entry rather than failing the whole call.
    pub async fn list_entries(&self, owner_id: OwnerId) -> Result<Vec<NoteEntry>, StoreError> {
        let key = self.keys.get_key().await?;
        let rows: Vec<NoteRow> = sqlx::query_as(
            "SELECT id, owner_id, title, content, created_at, updated_at FROM notes WHERE owner_id = ? ORDER BY id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let aad = aad_for(owner_id);
        let entries: Vec<NoteEntry> = rows
            .into_iter()
            .map(|row| {
                let content = key.decrypt(&row.content, aad.as_bytes());
                if let Err(e) = &content {
                    warn!(owner_id, note_id = row.id, error = %e, "note failed to decrypt");
                }
                NoteEntry {
                    id: row.id,
                    title: row.title,
                    content,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect();

        debug!(owner_id, count = entries.len(), "notes listed");
        Ok(entries)
    }

    /// Re-encrypt and replace the content of note `note_id` owned by
    /// `owner_id`.  Matching no row is not an error.
    pub async fn edit(
        &self,
        owner_id: OwnerId,
        note_id: NoteId,
        new_content: &str,
    ) -> Result<(), StoreError> {
        let content_enc = self.encrypt_content(owner_id, new_content).await?;

        let result = sqlx::query(
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(&content_enc)
        .bind(Utc::now())
        .bind(note_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        debug!(owner_id, note_id, rows = result.rows_affected(), "note edit");
        Ok(())
    }

    /// Remove note `note_id` owned by `owner_id`.  Matching no row is not an
    /// error.  Needs no key.
    pub async fn delete(&self, owner_id: OwnerId, note_id: NoteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(note_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        debug!(owner_id, note_id, rows = result.rows_affected(), "note delete");
        Ok(())
    }

    /// Number of notes owned by `owner_id`.
    pub async fn count(&self, owner_id: OwnerId) -> Result<i64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreError};
    use nv_crypto::{KeyProvider, NoteKey};

    async fn store() -> Store {
        Store::open_in_memory(KeyProvider::from_key(NoteKey::from_bytes([9u8; 32])))
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn list_of_unknown_owner_is_empty() {
        let store = store().await;
        assert!(store.list(42).await.unwrap().is_empty());
        assert_eq!(store.count(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn edit_touches_updated_at_only() {
        let store = store().await;
        let id = store.add(1, "t", "before").await.unwrap();
        let before = store.list(1).await.unwrap().remove(0);

        store.edit(1, id, "after").await.unwrap();
        let after = store.list(1).await.unwrap().remove(0);

        assert_eq!(after.title, "t");
        assert_eq!(after.content, "after");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn unicode_and_long_content_round_trip() {
        let store = store().await;
        let long = "é🔒".repeat(2_000);
        store.add(5, "ünïcødé", &long).await.unwrap();
        let notes = store.list(5).await.unwrap();
        assert_eq!(notes[0].title, "ünïcødé");
        assert_eq!(notes[0].content, long);
    }

    #[tokio::test]
    async fn token_moved_to_another_owner_fails_to_decrypt() {
        let store = store().await;
        store.add(1, "mine", "private").await.unwrap();
        let id_b = store.add(2, "theirs", "placeholder").await.unwrap();

        // Copy owner 1's ciphertext onto owner 2's row behind the store's back.
        sqlx::query("UPDATE notes SET content = (SELECT content FROM notes WHERE owner_id = 1) WHERE id = ?")
            .bind(id_b)
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.list(2).await.unwrap_err();
        assert!(matches!(err, StoreError::Decryption { note_id, .. } if note_id == id_b));
        assert_eq!(store.list(1).await.unwrap()[0].content, "private");
    }
}
