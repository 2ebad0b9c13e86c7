//! Database abstraction over SQLite via sqlx.

use std::path::Path;
use std::str::FromStr;

use nv_crypto::KeyProvider;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::{error::StoreError, models::OwnerId};

const AAD_PREFIX: &str = "nv-note-v1:owner=";

/// Central store handle.  Cheap to clone (pool and key provider are shared).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
    pub keys: KeyProvider,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically; safe on every start.
    ///
    /// The key is not read here. It is loaded on the first operation that
    /// needs it, or earlier if the caller runs [`KeyProvider::preload`].
    pub async fn open(db_path: &Path, keys: KeyProvider) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(opts).await?;
        run_migrations(&pool).await?;
        debug!(path = %db_path.display(), "note store opened");

        Ok(Self { pool, keys })
    }

    /// Private in-memory database.  A single pooled connection keeps the
    /// database alive for the life of the store.
    pub async fn open_in_memory(keys: KeyProvider) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        run_migrations(&pool).await?;

        Ok(Self { pool, keys })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// Encrypt note content for `owner_id` with the current key.
    pub(crate) async fn encrypt_content(
        &self,
        owner_id: OwnerId,
        plaintext: &str,
    ) -> Result<String, StoreError> {
        let key = self.keys.get_key().await?;
        Ok(key.encrypt(plaintext, aad_for(owner_id).as_bytes())?)
    }
}

/// Embedded schema migrations from `migrations/`.
async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))
}

/// Associated data binding a token to its owner.
pub(crate) fn aad_for(owner_id: OwnerId) -> String {
    format!("{AAD_PREFIX}{owner_id}")
}
