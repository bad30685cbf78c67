//! 3DES-ECB with PKCS#7 padding, as mandated for the `content` block.
//!
//! Byte-in, byte-out. Base64 framing is left to the caller.

use crate::error::{Error, Result};
use des::TdesEde3;
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use std::fmt;

type TdesEcbEnc = ecb::Encryptor<TdesEde3>;
type TdesEcbDec = ecb::Decryptor<TdesEde3>;

pub const KEY_LEN: usize = 24;
pub const BLOCK_LEN: usize = 8;

/// A three-key 3DES key. Only exact-length material is accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| Error::Key {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    /// The shared secret issued by the platform is used byte for byte.
    pub fn from_secret(secret: &str) -> Result<Self> {
        Self::new(secret.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

impl TryFrom<&[u8]> for CipherKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::new(bytes)
    }
}

pub fn encrypt(plaintext: &[u8], key: &CipherKey) -> Result<Vec<u8>> {
    let cipher = TdesEcbEnc::new_from_slice(key.as_bytes()).map_err(|_| Error::Key {
        expected: KEY_LEN,
        actual: key.as_bytes().len(),
    })?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

pub fn decrypt(ciphertext: &[u8], key: &CipherKey) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(Error::Decrypt(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_LEN}",
            ciphertext.len()
        )));
    }
    let cipher = TdesEcbDec::new_from_slice(key.as_bytes()).map_err(|_| Error::Key {
        expected: KEY_LEN,
        actual: key.as_bytes().len(),
    })?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::Decrypt("invalid padding".to_string()))
}
