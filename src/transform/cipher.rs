use std::fmt;
use std::path::Path;

use aes::Aes256;
use blowfish::Blowfish;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;
type BlowfishCfbEnc = cfb_mode::Encryptor<Blowfish>;
type BlowfishCfbDec = cfb_mode::Decryptor<Blowfish>;

/// Length of the random nonce that prefixes every ChaCha20-Poly1305 message.
pub const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherKind {
    /// AES-256 in CFB mode over PKCS#7-padded input.
    Aes256Cfb,
    /// Blowfish with a 128-bit key in CFB mode over PKCS#7-padded input.
    BlowfishCfb,
    /// ChaCha20-Poly1305 with a fresh random nonce per message.
    ChaCha20Poly1305,
}

impl CipherKind {
    #[must_use]
    pub const fn key_len(&self) -> usize {
        match self {
            Self::Aes256Cfb | Self::ChaCha20Poly1305 => 32,
            Self::BlowfishCfb => 16,
        }
    }

    /// IV length for the CFB ciphers. ChaCha20-Poly1305 takes no IV from the
    /// caller; its nonce travels with the ciphertext.
    #[must_use]
    pub const fn iv_len(&self) -> usize {
        match self {
            Self::Aes256Cfb => 16,
            Self::BlowfishCfb => 8,
            Self::ChaCha20Poly1305 => 0,
        }
    }

    /// Padding block size for the CFB ciphers.
    #[must_use]
    pub const fn block_size(&self) -> Option<usize> {
        match self {
            Self::Aes256Cfb => Some(16),
            Self::BlowfishCfb => Some(8),
            Self::ChaCha20Poly1305 => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Aes256Cfb => "AES",
            Self::BlowfishCfb => "Blowfish",
            Self::ChaCha20Poly1305 => "ChaCha20Poly1305",
        }
    }
}

impl fmt::Display for CipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Key and IV for one cipher, checked for length on construction.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    cipher: CipherKind,
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(cipher: CipherKind, key: Vec<u8>, iv: Vec<u8>) -> Result<Self> {
        if key.len() != cipher.key_len() {
            return Err(ProbeError::InvalidKey {
                cipher: cipher.name(),
                expected: cipher.key_len(),
                actual: key.len(),
            });
        }
        if iv.len() != cipher.iv_len() {
            return Err(ProbeError::InvalidKey {
                cipher: cipher.name(),
                expected: cipher.iv_len(),
                actual: iv.len(),
            });
        }
        Ok(Self { cipher, key, iv })
    }

    /// Splits `raw` into key then IV, the layout of a key file. A
    /// ChaCha20-Poly1305 key file holds the key alone.
    pub fn from_bytes(cipher: CipherKind, raw: &[u8]) -> Result<Self> {
        let expected = cipher.key_len() + cipher.iv_len();
        if raw.len() != expected {
            return Err(ProbeError::InvalidKey {
                cipher: cipher.name(),
                expected,
                actual: raw.len(),
            });
        }
        let (key, iv) = raw.split_at(cipher.key_len());
        Self::new(cipher, key.to_vec(), iv.to_vec())
    }

    pub fn from_key_file(cipher: CipherKind, path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|err| ProbeError::io(path.to_string_lossy(), err))?;
        Self::from_bytes(cipher, &raw)
    }

    #[must_use]
    pub fn cipher(&self) -> CipherKind {
        self.cipher
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("cipher", &self.cipher)
            .field("key", &"<redacted>")
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

pub fn encrypt(material: &KeyMaterial, plaintext: &[u8]) -> Result<Vec<u8>> {
    let KeyMaterial { cipher, key, iv } = material;
    match cipher {
        CipherKind::Aes256Cfb => {
            let mut buf = pkcs7_pad(plaintext, 16);
            Aes256CfbEnc::new_from_slices(key, iv)
                .map_err(|_| ProbeError::Encrypt(rejected(*cipher)))?
                .encrypt(&mut buf);
            Ok(buf)
        }
        CipherKind::BlowfishCfb => {
            let mut buf = pkcs7_pad(plaintext, 8);
            BlowfishCfbEnc::new_from_slices(key, iv)
                .map_err(|_| ProbeError::Encrypt(rejected(*cipher)))?
                .encrypt(&mut buf);
            Ok(buf)
        }
        CipherKind::ChaCha20Poly1305 => {
            let aead = ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| ProbeError::Encrypt(rejected(*cipher)))?;
            let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
            let sealed = aead
                .encrypt(&nonce, plaintext)
                .map_err(|_| ProbeError::Encrypt("AEAD seal failed".into()))?;
            let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&sealed);
            Ok(out)
        }
    }
}

pub fn decrypt(material: &KeyMaterial, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let KeyMaterial { cipher, key, iv } = material;
    match cipher {
        CipherKind::Aes256Cfb => {
            let mut buf = ciphertext.to_vec();
            Aes256CfbDec::new_from_slices(key, iv)
                .map_err(|_| ProbeError::Decrypt(rejected(*cipher)))?
                .decrypt(&mut buf);
            pkcs7_unpad(buf, 16)
        }
        CipherKind::BlowfishCfb => {
            let mut buf = ciphertext.to_vec();
            BlowfishCfbDec::new_from_slices(key, iv)
                .map_err(|_| ProbeError::Decrypt(rejected(*cipher)))?
                .decrypt(&mut buf);
            pkcs7_unpad(buf, 8)
        }
        CipherKind::ChaCha20Poly1305 => {
            let aead = ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| ProbeError::Decrypt(rejected(*cipher)))?;
            let (nonce, sealed) = ciphertext.split_at_checked(NONCE_LEN).ok_or_else(|| {
                ProbeError::Decrypt(format!(
                    "ciphertext of {} bytes has no room for a {NONCE_LEN}-byte nonce",
                    ciphertext.len()
                ))
            })?;
            aead.decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| ProbeError::Decrypt("authentication tag mismatch".into()))
        }
    }
}

fn rejected(cipher: CipherKind) -> String {
    format!("{cipher} rejected key material")
}

fn pkcs7_pad(data: &[u8], block: usize) -> Vec<u8> {
    let pad = block - data.len() % block;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

fn pkcs7_unpad(mut data: Vec<u8>, block: usize) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % block != 0 {
        return Err(ProbeError::Decrypt(format!(
            "ciphertext length {} is not a multiple of {block}",
            data.len()
        )));
    }
    let pad = data[data.len() - 1] as usize;
    let tail_ok = (1..=block).contains(&pad)
        && data[data.len() - pad..].iter().all(|&b| b as usize == pad);
    if !tail_ok {
        return Err(ProbeError::Decrypt("invalid padding".into()));
    }
    data.truncate(data.len() - pad);
    Ok(data)
}
