//! Authenticated Encryption with Associated Data
//!
//! Uses XChaCha20-Poly1305 (192-bit nonce).
//! Key size: 32 bytes.  Nonce: 24 bytes (random).  Tag: 16 bytes.
//!
//! Token wire format (URL-safe base64, no padding):
//!   [ version (1 byte) | nonce (24 bytes) | ciphertext + tag ]
//!
//! A token is self-contained: the key is the only other input needed to
//! decrypt it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng, Payload},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

pub const TOKEN_VERSION: u8 = 0x01;
pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte key, prepending a random 24-byte nonce.
/// `aad` — additional associated data (authenticated but not encrypted).
pub fn encrypt(key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::AeadEncrypt)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt wire-format bytes (nonce || ciphertext+tag).
pub fn decrypt(
    key: &[u8; 32],
    data: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::AeadDecrypt);
    }
    let (nonce_bytes, ct) = data.split_at(NONCE_LEN);
    let nonce = XNonce::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::AeadDecrypt)?;

    let plaintext = cipher
        .decrypt(nonce, Payload { msg: ct, aad })
        .map_err(|_| CryptoError::AeadDecrypt)?;

    Ok(Zeroizing::new(plaintext))
}

/// Encrypt UTF-8 text into a versioned base64url token.
pub fn encrypt_token(key: &[u8; 32], plaintext: &str, aad: &[u8]) -> Result<String, CryptoError> {
    let sealed = encrypt(key, plaintext.as_bytes(), aad)?;
    let mut framed = Vec::with_capacity(1 + sealed.len());
    framed.push(TOKEN_VERSION);
    framed.extend_from_slice(&sealed);
    Ok(URL_SAFE_NO_PAD.encode(framed))
}

/// Decrypt a token produced by [`encrypt_token`] back into text.
pub fn decrypt_token(key: &[u8; 32], token: &str, aad: &[u8]) -> Result<String, CryptoError> {
    let framed = URL_SAFE_NO_PAD.decode(token.trim())?;
    let (version, sealed) = framed
        .split_first()
        .ok_or_else(|| CryptoError::MalformedToken("empty token".into()))?;
    if *version != TOKEN_VERSION {
        return Err(CryptoError::UnsupportedVersion(*version));
    }
    let plaintext = decrypt(key, sealed, aad)?;
    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn token_round_trip() {
        let token = encrypt_token(&KEY, "milk, eggs", b"aad").unwrap();
        assert_ne!(token, "milk, eggs");
        assert_eq!(decrypt_token(&KEY, &token, b"aad").unwrap(), "milk, eggs");
    }

    #[test]
    fn same_plaintext_gives_distinct_tokens() {
        let a = encrypt_token(&KEY, "same", b"").unwrap();
        let b = encrypt_token(&KEY, "same", b"").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let token = encrypt_token(&KEY, "", b"").unwrap();
        assert_eq!(decrypt_token(&KEY, &token, b"").unwrap(), "");
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = encrypt_token(&KEY, "secret", b"").unwrap();
        let err = decrypt_token(&[8u8; 32], &token, b"").unwrap_err();
        assert!(matches!(err, CryptoError::AeadDecrypt));
    }

    #[test]
    fn wrong_aad_is_rejected() {
        let token = encrypt_token(&KEY, "secret", b"owner=1").unwrap();
        let err = decrypt_token(&KEY, &token, b"owner=2").unwrap_err();
        assert!(matches!(err, CryptoError::AeadDecrypt));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = encrypt_token(&KEY, "secret", b"").unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(raw);
        assert!(matches!(
            decrypt_token(&KEY, &tampered, b""),
            Err(CryptoError::AeadDecrypt)
        ));
    }

    #[test]
    fn garbage_and_unknown_versions_are_rejected() {
        assert!(matches!(
            decrypt_token(&KEY, "not base64 !!", b""),
            Err(CryptoError::Base64Decode(_))
        ));
        assert!(matches!(
            decrypt_token(&KEY, "", b""),
            Err(CryptoError::MalformedToken(_))
        ));
        let bogus = URL_SAFE_NO_PAD.encode([0x80u8; 64]);
        assert!(matches!(
            decrypt_token(&KEY, &bogus, b""),
            Err(CryptoError::UnsupportedVersion(0x80))
        ));
        let short = URL_SAFE_NO_PAD.encode([TOKEN_VERSION, 1, 2, 3]);
        assert!(matches!(
            decrypt_token(&KEY, &short, b""),
            Err(CryptoError::AeadDecrypt)
        ));
    }
}
