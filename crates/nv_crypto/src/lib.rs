//! nv_crypto — key material and content encryption for notevault
//!
//! # Module layout
//! - `key`   — loads the single note key from disk and caches it per process
//! - `aead`  — XChaCha20-Poly1305 helpers and the text token format
//! - `error` — error types for both

pub mod aead;
pub mod error;
pub mod key;

pub use error::{CryptoError, KeyError};
pub use key::{generate_key_file, KeyProvider, NoteKey};
