use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classify::{Classifier, ClassifierConfig, ContentClass};
use crate::error::{ProbeError, Result};
use crate::extractor::FeatureExtractor;
use crate::source::read_file;

use super::cipher::{self, KeyMaterial};
use super::codec::{self, Codec};

#[derive(Debug, Clone)]
pub enum Operation {
    Encrypt(KeyMaterial),
    Decrypt(KeyMaterial),
    Compress(Codec),
    Decompress(Codec),
}

/// Everything a transform run needs; there is no global state.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub operation: Operation,
    /// Skip compressing inputs that already look compressed or encrypted.
    pub skip_high_entropy: bool,
    pub classifier: ClassifierConfig,
}

impl TransformConfig {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            skip_high_entropy: false,
            classifier: ClassifierConfig::default(),
        }
    }

    pub fn skip_high_entropy(mut self, skip: bool) -> Self {
        self.skip_high_entropy = skip;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}

/// One input file and where its transformed bytes go. Choosing output names
/// is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TransformJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformStatus {
    Written { bytes_in: u64, bytes_out: u64 },
    Skipped { entropy: f64 },
}

#[derive(Debug)]
pub struct TransformOutcome {
    pub job: TransformJob,
    pub result: Result<TransformStatus>,
}

pub struct TransformService {
    config: TransformConfig,
    extractor: FeatureExtractor,
    classifier: Classifier,
}

impl TransformService {
    pub fn new(config: TransformConfig) -> Self {
        let classifier = Classifier::with_config(config.classifier.clone());
        Self {
            config,
            extractor: FeatureExtractor::new(),
            classifier,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Applies the configured operation to an in-memory buffer.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        match &self.config.operation {
            Operation::Encrypt(material) => cipher::encrypt(material, data),
            Operation::Decrypt(material) => cipher::decrypt(material, data),
            Operation::Compress(codec) => codec::compress(*codec, data),
            Operation::Decompress(codec) => codec::decompress(*codec, data),
        }
    }

    /// Entropy of `data` when compressing it would be wasted effort.
    fn incompressible(&self, data: &[u8]) -> Option<f64> {
        if !self.config.skip_high_entropy
            || !matches!(self.config.operation, Operation::Compress(_))
        {
            return None;
        }
        let verdict = self.classifier.classify(&self.extractor.analyze_bytes(data));
        (verdict.class == ContentClass::CompressedOrEncrypted).then_some(verdict.entropy)
    }

    pub fn run_job(&self, job: &TransformJob) -> Result<TransformStatus> {
        let data = read_file(&job.input)?;
        if let Some(entropy) = self.incompressible(&data) {
            tracing::info!(
                input = %job.input.display(),
                entropy,
                "content already high-entropy, not compressing"
            );
            return Ok(TransformStatus::Skipped { entropy });
        }

        let out = self.apply(&data)?;
        write_output(&job.output, &out)?;
        tracing::info!(
            input = %job.input.display(),
            output = %job.output.display(),
            bytes_in = data.len(),
            bytes_out = out.len(),
            "transformed"
        );
        Ok(TransformStatus::Written {
            bytes_in: data.len() as u64,
            bytes_out: out.len() as u64,
        })
    }

    /// Runs every job in parallel. A failing job is reported in its outcome
    /// and does not stop the others.
    pub fn run(&self, jobs: Vec<TransformJob>) -> Vec<TransformOutcome> {
        jobs.into_par_iter()
            .map(|job| {
                let result = self.run_job(&job);
                if let Err(err) = &result {
                    tracing::warn!(input = %job.input.display(), error = %err, "transform failed");
                }
                TransformOutcome { job, result }
            })
            .collect()
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ProbeError::io(parent.to_string_lossy(), err))?;
    }
    fs::write(path, data).map_err(|err| ProbeError::io(path.to_string_lossy(), err))
}
