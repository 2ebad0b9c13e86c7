//! nv_store — encrypted per-owner note storage
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt.  Note bodies are encrypted at the
//! application level before they are written:
//! - `content` is stored as an XChaCha20-Poly1305 token (base64url), bound
//!   to the owning `owner_id` through associated data.
//! - `title`, `owner_id` and timestamps stay in plaintext so rows can be
//!   selected and ordered without the key.
//! - The key comes from a [`nv_crypto::KeyProvider`] injected at open time.
//!
//! # Ownership
//! Every statement that reads or mutates a row carries `owner_id` in its
//! WHERE clause.  Edits and deletes that match nothing succeed silently.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on every open; they are
//! idempotent.

pub mod db;
pub mod error;
pub mod models;
pub mod notes;

pub use db::Store;
pub use error::StoreError;
pub use models::{Note, NoteEntry, NoteId, OwnerId};
