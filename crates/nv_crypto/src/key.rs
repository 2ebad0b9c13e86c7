//! Note key lifecycle.
//!
//! One 32-byte key per process, read from a fixed local file on first use
//! and cached for the lifetime of the [`KeyProvider`]. A missing key file is
//! a deployment error: nothing in here generates a key implicitly. Operators
//! create one explicitly with [`generate_key_file`].
//!
//! Accepted key file contents:
//! - exactly 32 raw bytes, or
//! - the URL-safe base64 text of 32 bytes (padded or not, whitespace ignored).

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use rand::RngCore;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::aead;
use crate::error::{CryptoError, KeyError};

pub const KEY_LEN: usize = 32;

/// 32-byte note encryption key. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct NoteKey([u8; KEY_LEN]);

impl NoteKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn encrypt(&self, plaintext: &str, aad: &[u8]) -> Result<String, CryptoError> {
        aead::encrypt_token(&self.0, plaintext, aad)
    }

    pub fn decrypt(&self, token: &str, aad: &[u8]) -> Result<String, CryptoError> {
        aead::decrypt_token(&self.0, token, aad)
    }
}

impl fmt::Debug for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoteKey(<redacted>)")
    }
}

struct ProviderInner {
    path: PathBuf,
    cell: OnceCell<Arc<NoteKey>>,
}

/// Lazily loads and caches the note key.  Clone to share; clones share the
/// same cache.
///
/// Concurrent first calls to [`KeyProvider::get_key`] all observe the same
/// key. A failed load is not cached, so a later call retries.
#[derive(Clone)]
pub struct KeyProvider {
    inner: Arc<ProviderInner>,
}

impl KeyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                path: path.into(),
                cell: OnceCell::new(),
            }),
        }
    }

    /// A provider that is already loaded with `key`. Never touches disk.
    pub fn from_key(key: NoteKey) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                path: PathBuf::new(),
                cell: OnceCell::new_with(Some(Arc::new(key))),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.cell.initialized()
    }

    /// Return the cached key, reading the key file on first use.
    pub async fn get_key(&self) -> Result<Arc<NoteKey>, KeyError> {
        self.inner
            .cell
            .get_or_try_init(|| async {
                let key = load_key_file(&self.inner.path).await?;
                info!(path = %self.inner.path.display(), "note key loaded");
                Ok::<_, KeyError>(Arc::new(key))
            })
            .await
            .map(Arc::clone)
    }

    /// Force the load now so a missing key fails at startup rather than on
    /// the first request.
    pub async fn preload(&self) -> Result<(), KeyError> {
        self.get_key().await.map(|_| ())
    }
}

impl fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyProvider")
            .field("path", &self.inner.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

async fn load_key_file(path: &Path) -> Result<NoteKey, KeyError> {
    let raw = match tokio::fs::read(path).await {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KeyError::KeyMissing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(KeyError::Io(e)),
    };
    debug!(path = %path.display(), len = raw.len(), "read key file");
    parse_key_material(&raw).map_err(|reason| KeyError::InvalidKey {
        path: path.to_path_buf(),
        reason,
    })
}

/// Interpret key file bytes as either raw key bytes or base64url text.
pub fn parse_key_material(raw: &[u8]) -> Result<NoteKey, String> {
    if raw.len() == KEY_LEN {
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(raw);
        return Ok(NoteKey(key));
    }

    let text = std::str::from_utf8(raw)
        .map_err(|_| format!("expected {KEY_LEN} raw bytes or base64 text"))?
        .trim();
    let engine = if text.ends_with('=') {
        &URL_SAFE
    } else {
        &URL_SAFE_NO_PAD
    };
    let decoded = Zeroizing::new(
        engine
            .decode(text)
            .map_err(|e| format!("base64 decode failed: {e}"))?,
    );
    if decoded.len() != KEY_LEN {
        return Err(format!(
            "decoded key is {} bytes, expected {KEY_LEN}",
            decoded.len()
        ));
    }
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&decoded);
    Ok(NoteKey(key))
}

/// Create a fresh random key file at `path` in base64url text form.
///
/// Refuses to overwrite an existing file. On unix the file is created
/// owner-readable only.
pub fn generate_key_file(path: &Path) -> Result<(), KeyError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(KeyError::AlreadyExists {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(KeyError::Io(e)),
    };

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rand::rngs::OsRng.fill_bytes(&mut key[..]);
    let encoded = Zeroizing::new(URL_SAFE.encode(&key[..]));
    file.write_all(encoded.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    info!(path = %path.display(), "generated new note key file");
    Ok(())
}
