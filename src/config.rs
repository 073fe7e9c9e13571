//! Analyzer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::{ProbeError, Result};

const KB: usize = 1024;
const MB: u64 = 1024 * 1024;

/// Options controlling how inputs are read and classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Read size used when streaming a source.
    pub chunk_size: usize,
    /// Files larger than this are streamed instead of loaded whole.
    pub stream_threshold: u64,
    pub classifier: ClassifierConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * KB,
            stream_threshold: 64 * MB,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ProbeConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ProbeError::io(path.to_string_lossy(), err))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ProbeError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ProbeError::Config("chunk_size must be non-zero".into()));
        }
        self.classifier.validate()
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_stream_threshold(mut self, threshold: u64) -> Self {
        self.stream_threshold = threshold;
        self
    }

    /// Streams every file regardless of size.
    pub fn always_stream(mut self) -> Self {
        self.stream_threshold = 0;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ProbeConfig::from_json_str(r#"{"chunk_size": 4096}"#).unwrap();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.stream_threshold, ProbeConfig::default().stream_threshold);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_nested_classifier_json() {
        let config =
            ProbeConfig::from_json_str(r#"{"classifier": {"high_entropy": 7.9}}"#).unwrap();
        assert_eq!(config.classifier.high_entropy, 7.9);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = ProbeConfig::from_json_str(r#"{"chunk_size": 0}"#).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            ProbeConfig::from_json_str("{chunk_size"),
            Err(ProbeError::Config(_))
        ));
    }
}
