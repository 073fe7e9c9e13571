//! Parallel analysis of an explicit list of files.
//!
//! Each file is read once; its SHA-256 digest is computed from the same bytes
//! the probes see. Inputs are independent, so they are spread over the rayon
//! pool with no shared mutable state.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::classify::{Classifier, Verdict};
use crate::error::Result;
use crate::extractor::FeatureExtractor;
use crate::features::FeatureVector;
use crate::source::{ByteSource, read_file};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub path: PathBuf,
    pub sha256: String,
    pub features: FeatureVector,
    pub verdict: Verdict,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<AnalysisReport>,
}

/// Passes bytes through while hashing them.
struct DigestReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

pub struct BatchAnalyzer {
    extractor: FeatureExtractor,
    classifier: Classifier,
}

impl BatchAnalyzer {
    pub fn new(extractor: FeatureExtractor) -> Self {
        let classifier = Classifier::with_config(extractor.config().classifier.clone());
        Self {
            extractor,
            classifier,
        }
    }

    /// Analyzes, hashes and classifies one file.
    pub fn inspect(&self, path: &Path) -> Result<AnalysisReport> {
        let source = ByteSource::Path(path);
        let (features, digest) = if self.extractor.streams(source)? {
            let mut reader = DigestReader {
                inner: source.open()?,
                hasher: Sha256::new(),
            };
            let features = self.extractor.stream(&mut reader, &source.label())?;
            (features, reader.hasher.finalize())
        } else {
            let data = read_file(path)?;
            (self.extractor.analyze_bytes(&data), Sha256::digest(&data))
        };

        let verdict = self.classifier.classify(&features);
        tracing::debug!(
            path = %path.display(),
            class = %verdict.class,
            entropy = verdict.entropy,
            "file inspected"
        );
        Ok(AnalysisReport {
            path: path.to_path_buf(),
            sha256: hex::encode(digest),
            features,
            verdict,
        })
    }

    /// Inspects every path in parallel. Output order follows input order and
    /// a failure on one path does not affect the others.
    pub fn inspect_all(&self, paths: &[PathBuf]) -> Vec<BatchEntry> {
        paths
            .par_iter()
            .map(|path| {
                let result = self.inspect(path);
                if let Err(err) = &result {
                    tracing::warn!(path = %path.display(), error = %err, "skipping file");
                }
                BatchEntry {
                    path: path.clone(),
                    result,
                }
            })
            .collect()
    }
}

impl Default for BatchAnalyzer {
    fn default() -> Self {
        Self::new(FeatureExtractor::new())
    }
}
