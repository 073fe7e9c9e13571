//! The feature extractor: one read of the input, every probe over the result.

use std::io::{ErrorKind, Read};

use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::features::{ContentProfile, FeatureVector, PROBES, Probe};
use crate::source::ByteSource;

#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ProbeConfig,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// The probes run by every analysis, in output order.
    pub fn probes(&self) -> &'static [Probe] {
        &PROBES
    }

    /// Analyzes a path or in-memory buffer.
    ///
    /// Files up to the configured stream threshold are read once into memory;
    /// larger ones are streamed in chunks. Either way the result is the same.
    /// Any read failure aborts the analysis with no partial result.
    pub fn analyze<'a>(&self, source: impl Into<ByteSource<'a>>) -> Result<FeatureVector> {
        let source = source.into();
        let label = source.label();

        let features = if self.streams(source)? {
            self.stream(source.open()?, &label)?
        } else {
            self.analyze_bytes(&source.load()?)
        };

        tracing::debug!(
            source = %label,
            len = features.content_len(),
            entropy = features.entropy(),
            "analysis complete"
        );
        Ok(features)
    }

    /// Whether `analyze` reads this source in chunks rather than whole.
    ///
    /// Only files above the stream threshold are streamed; in-memory buffers
    /// never are.
    pub fn streams(&self, source: ByteSource<'_>) -> Result<bool> {
        match source {
            ByteSource::Path(_) => Ok(source.len()? > self.config.stream_threshold),
            ByteSource::Bytes(_) => Ok(false),
        }
    }

    /// Analyzes a buffer that is already in memory. Never fails.
    pub fn analyze_bytes(&self, data: &[u8]) -> FeatureVector {
        FeatureVector::from_profile(&ContentProfile::from_bytes(data))
    }

    /// Analyzes any reader in fixed-size chunks, holding at most one chunk.
    pub fn analyze_reader<R: Read>(&self, reader: R) -> Result<FeatureVector> {
        self.stream(reader, "<reader>")
    }

    /// Chunked analysis; read errors carry `label`.
    pub(crate) fn stream<R: Read>(&self, mut reader: R, label: &str) -> Result<FeatureVector> {
        let mut buffer = vec![0u8; self.config.chunk_size.max(1)];
        let mut profile = ContentProfile::new();
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => profile.update(&buffer[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProbeError::io(label, err)),
            }
        }
        Ok(FeatureVector::from_profile(&profile))
    }
}

/// Analyzes `source` with the default configuration.
pub fn analyze<'a>(source: impl Into<ByteSource<'a>>) -> Result<FeatureVector> {
    FeatureExtractor::new().analyze(source)
}
