//! Magic-byte signature rules.
//!
//! Each rule names a feature, the byte range it reads from the start of the
//! content, and the pattern expected there. Rules only ever look at the
//! leading [`HEADER_LEN`] bytes, so a streamed input needs to retain no more
//! than that prefix to be matched.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Longest prefix any rule inspects.
pub const HEADER_LEN: usize = 8;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Mp3,
    Mp4,
    Jpeg,
    Png,
    Wav,
}

impl FileFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Wav => "wav",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Mp4 => "MP4",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Wav => "WAV",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The whole range must be present and equal the pattern.
    Exact,
    /// The range must start with the pattern; bytes after it are ignored.
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRule {
    name: &'static str,
    range: Range<usize>,
    pattern: &'static [u8],
    comparison: Comparison,
    format: FileFormat,
}

impl SignatureRule {
    #[must_use]
    pub const fn new(
        name: &'static str,
        range: Range<usize>,
        pattern: &'static [u8],
        comparison: Comparison,
        format: FileFormat,
    ) -> Self {
        Self {
            name,
            range,
            pattern,
            comparison,
            format,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    #[must_use]
    pub const fn pattern(&self) -> &'static [u8] {
        self.pattern
    }

    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[must_use]
    pub const fn format(&self) -> FileFormat {
        self.format
    }

    /// Checks the rule against the leading bytes of some content.
    ///
    /// Content shorter than the rule requires never matches.
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        match self.comparison {
            Comparison::Exact => data
                .get(self.range.clone())
                .is_some_and(|window| window == self.pattern),
            Comparison::Prefix => data
                .get(self.range.start..self.range.start + self.pattern.len())
                .is_some_and(|window| window == self.pattern),
        }
    }
}

pub const MP3_ID3: SignatureRule =
    SignatureRule::new("is_mp3", 0..3, b"ID3", Comparison::Exact, FileFormat::Mp3);
pub const MP4_FTYP: SignatureRule =
    SignatureRule::new("is_mp4", 4..8, b"ftyp", Comparison::Exact, FileFormat::Mp4);
pub const JPEG_SOI: SignatureRule = SignatureRule::new(
    "is_jpg",
    0..2,
    &[0xFF, 0xD8],
    Comparison::Exact,
    FileFormat::Jpeg,
);
pub const PNG_MAGIC: SignatureRule = SignatureRule::new(
    "is_png",
    0..8,
    &PNG_SIGNATURE,
    Comparison::Exact,
    FileFormat::Png,
);
pub const WAV_RIFF: SignatureRule =
    SignatureRule::new("is_wav", 0..4, b"RIFF", Comparison::Exact, FileFormat::Wav);

/// All signature rules in probe declaration order.
pub const SIGNATURE_RULES: [SignatureRule; 5] = [MP3_ID3, MP4_FTYP, JPEG_SOI, PNG_MAGIC, WAV_RIFF];
