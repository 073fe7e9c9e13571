use std::io;
use thiserror::Error;

/// Errors surfaced by analysis and by the transform service.
///
/// Probes themselves never fail: an input that can be read always yields a
/// complete feature vector, including the empty input.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("I/O error reading {source_label}: {err}")]
    Io {
        source_label: String,
        #[source]
        err: io::Error,
    },

    #[error("Invalid key material for {cipher}: expected {expected} bytes, got {actual}")]
    InvalidKey {
        cipher: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),

    #[error("Compression error: {0}")]
    Compression(#[source] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProbeError {
    pub(crate) fn io(source_label: impl Into<String>, err: io::Error) -> Self {
        Self::Io {
            source_label: source_label.into(),
            err,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
