//! Byte-level file fingerprinting.
//!
//! [`FeatureExtractor`] reads an input once and runs a fixed, ordered battery
//! of probes over it: magic-byte signatures (MP3, MP4, JPEG, PNG, WAV), a
//! line-break scan, Shannon entropy and length parity. The resulting
//! [`FeatureVector`] feeds format detection and the [`transform`] service,
//! which uses the entropy measurement to avoid recompressing content that is
//! already compressed or encrypted.

pub mod batch;
pub mod classify;
pub mod config;
pub mod entropy;
mod error;
pub mod extractor;
pub mod features;
pub mod signatures;
pub mod source;
pub mod transform;

pub use batch::{AnalysisReport, BatchAnalyzer, BatchEntry};
pub use classify::{Classifier, ClassifierConfig, ContentClass, Verdict};
pub use config::ProbeConfig;
pub use entropy::{ByteHistogram, shannon_entropy};
pub use error::{ProbeError, Result};
pub use extractor::{FeatureExtractor, analyze};
pub use features::{FeatureValue, FeatureVector};
pub use signatures::{FileFormat, SignatureRule};
pub use source::ByteSource;
