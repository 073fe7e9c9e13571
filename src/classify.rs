use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entropy::MAX_ENTROPY;
use crate::error::{ProbeError, Result};
use crate::features::FeatureVector;
use crate::signatures::{FileFormat, SIGNATURE_RULES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    Empty,
    Text,
    Structured,
    CompressedOrEncrypted,
}

impl ContentClass {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text => "text",
            Self::Structured => "structured",
            Self::CompressedOrEncrypted => "compressed/encrypted",
        }
    }
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub format: Option<FileFormat>,
    pub class: ContentClass,
    pub entropy: f64,
}

impl Verdict {
    /// Whether running a general-purpose compressor over the content is
    /// likely to pay off.
    #[inline]
    #[must_use]
    pub fn worth_compressing(&self) -> bool {
        !matches!(
            self.class,
            ContentClass::CompressedOrEncrypted | ContentClass::Empty
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// At or above this entropy content is treated as compressed or encrypted.
    pub high_entropy: f64,
    /// Content with line breaks at or below this entropy counts as text.
    pub text_max_entropy: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            high_entropy: 7.5,
            text_max_entropy: 6.0,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=MAX_ENTROPY).contains(&v);
        if !in_range(self.high_entropy) || !in_range(self.text_max_entropy) {
            return Err(ProbeError::Config(format!(
                "entropy thresholds must lie in [0, {MAX_ENTROPY}]"
            )));
        }
        if self.text_max_entropy > self.high_entropy {
            return Err(ProbeError::Config(
                "text_max_entropy must not exceed high_entropy".into(),
            ));
        }
        Ok(())
    }
}

pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, features: &FeatureVector) -> Verdict {
        let format = SIGNATURE_RULES
            .iter()
            .find(|rule| {
                features
                    .get(rule.name())
                    .and_then(|value| value.as_flag())
                    .unwrap_or(false)
            })
            .map(|rule| rule.format());
        let entropy = features.entropy();

        let class = if features.content_len() == 0 {
            ContentClass::Empty
        } else if entropy >= self.config.high_entropy {
            ContentClass::CompressedOrEncrypted
        } else if features.has_spaces_or_newlines() && entropy <= self.config.text_max_entropy {
            ContentClass::Text
        } else {
            ContentClass::Structured
        };

        Verdict {
            format,
            class,
            entropy,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
