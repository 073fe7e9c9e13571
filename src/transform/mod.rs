//! Encryption and compression transforms.
//!
//! Standard primitives only: AES-256 and Blowfish in CFB mode, ChaCha20-Poly1305,
//! zlib-framed DEFLATE and xz/LZMA. Keys are supplied by the caller. The
//! pipeline can consult the analyzer's entropy measurement to skip compressing
//! content that is already compressed or encrypted.

mod cipher;
mod codec;
mod pipeline;

pub use cipher::{CipherKind, KeyMaterial, NONCE_LEN, decrypt, encrypt};
pub use codec::{Codec, compress, decompress};
pub use pipeline::{
    Operation, TransformConfig, TransformJob, TransformOutcome, TransformService, TransformStatus,
};
