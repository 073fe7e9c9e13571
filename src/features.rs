//! Feature vectors and the probe battery that fills them.
//!
//! Every probe is a pure function of a [`ContentProfile`], the single-pass
//! summary of an input (leading bytes plus a byte histogram). Buffered and
//! streamed inputs build the same profile, so both yield identical vectors.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::entropy::ByteHistogram;
use crate::signatures::{
    HEADER_LEN, JPEG_SOI, MP3_ID3, MP4_FTYP, PNG_MAGIC, SignatureRule, WAV_RIFF,
};

pub const IS_MP3: &str = "is_mp3";
pub const IS_MP4: &str = "is_mp4";
pub const IS_JPG: &str = "is_jpg";
pub const IS_PNG: &str = "is_png";
pub const IS_WAV: &str = "is_wav";
pub const HAS_SPACES_OR_NEWLINES: &str = "has_spaces_or_newlines";
pub const ENTROPY: &str = "entropy";
/// File-size parity. The name is kept for compatibility with existing
/// consumers; it has nothing to do with checksum weight.
pub const IS_EVEN_WEIGHT: &str = "is_even_weight";

const CARRIAGE_RETURN: u8 = 0x0D;
const LINE_FEED: u8 = 0x0A;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Flag(bool),
    Real(f64),
}

impl FeatureValue {
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match *self {
            Self::Flag(flag) => Some(flag),
            Self::Real(_) => None,
        }
    }

    #[must_use]
    pub const fn as_real(&self) -> Option<f64> {
        match *self {
            Self::Real(value) => Some(value),
            Self::Flag(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Real(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Flag(flag) => serializer.serialize_bool(flag),
            Self::Real(value) => serializer.serialize_f64(value),
        }
    }
}

/// Single-pass summary of an input: its leading bytes and byte histogram.
#[derive(Debug, Clone, Default)]
pub struct ContentProfile {
    header: [u8; HEADER_LEN],
    header_len: usize,
    histogram: ByteHistogram,
}

impl ContentProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut profile = Self::new();
        profile.update(data);
        profile
    }

    /// Feeds the next chunk of content.
    pub fn update(&mut self, chunk: &[u8]) {
        if self.header_len < HEADER_LEN {
            let take = (HEADER_LEN - self.header_len).min(chunk.len());
            self.header[self.header_len..self.header_len + take].copy_from_slice(&chunk[..take]);
            self.header_len += take;
        }
        self.histogram.update(chunk);
    }

    /// The leading bytes of the content, at most [`HEADER_LEN`] of them.
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.header[..self.header_len]
    }

    #[must_use]
    pub fn histogram(&self) -> &ByteHistogram {
        &self.histogram
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.histogram.total()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    #[must_use]
    pub fn has_line_break(&self) -> bool {
        self.histogram.count(CARRIAGE_RETURN) > 0 || self.histogram.count(LINE_FEED) > 0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ProbeKind {
    Signature(&'static SignatureRule),
    LineBreaks,
    Entropy,
    EvenLength,
}

/// A named probe. The battery is plain data: adding a probe means adding a
/// descriptor to [`PROBES`].
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub name: &'static str,
    pub kind: ProbeKind,
}

impl Probe {
    pub const fn new(name: &'static str, kind: ProbeKind) -> Self {
        Self { name, kind }
    }

    #[must_use]
    pub fn evaluate(&self, profile: &ContentProfile) -> FeatureValue {
        match self.kind {
            ProbeKind::Signature(rule) => FeatureValue::Flag(rule.matches(profile.header())),
            ProbeKind::LineBreaks => FeatureValue::Flag(profile.has_line_break()),
            ProbeKind::Entropy => FeatureValue::Real(profile.histogram().entropy()),
            ProbeKind::EvenLength => FeatureValue::Flag(profile.len() % 2 == 0),
        }
    }
}

pub static PROBES: [Probe; 8] = [
    Probe::new(IS_MP3, ProbeKind::Signature(&MP3_ID3)),
    Probe::new(IS_MP4, ProbeKind::Signature(&MP4_FTYP)),
    Probe::new(IS_JPG, ProbeKind::Signature(&JPEG_SOI)),
    Probe::new(IS_PNG, ProbeKind::Signature(&PNG_MAGIC)),
    Probe::new(IS_WAV, ProbeKind::Signature(&WAV_RIFF)),
    Probe::new(HAS_SPACES_OR_NEWLINES, ProbeKind::LineBreaks),
    Probe::new(ENTROPY, ProbeKind::Entropy),
    Probe::new(IS_EVEN_WEIGHT, ProbeKind::EvenLength),
];

/// Ordered feature-name to value mapping for one input.
///
/// Holds exactly one entry per probe in [`PROBES`], in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(&'static str, FeatureValue)>,
    len: u64,
}

impl FeatureVector {
    /// Runs every probe over `profile`.
    #[must_use]
    pub fn from_profile(profile: &ContentProfile) -> Self {
        let entries = PROBES
            .iter()
            .map(|probe| {
                let value = probe.evaluate(profile);
                tracing::trace!(probe = probe.name, %value, "probe evaluated");
                (probe.name, value)
            })
            .collect();
        Self {
            entries,
            len: profile.len(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(|value| value.as_flag()).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Number of features, always `PROBES.len()`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length in bytes of the analyzed content.
    #[must_use]
    pub fn content_len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_mp3(&self) -> bool {
        self.flag(IS_MP3)
    }

    #[must_use]
    pub fn is_mp4(&self) -> bool {
        self.flag(IS_MP4)
    }

    #[must_use]
    pub fn is_jpg(&self) -> bool {
        self.flag(IS_JPG)
    }

    #[must_use]
    pub fn is_png(&self) -> bool {
        self.flag(IS_PNG)
    }

    #[must_use]
    pub fn is_wav(&self) -> bool {
        self.flag(IS_WAV)
    }

    #[must_use]
    pub fn has_spaces_or_newlines(&self) -> bool {
        self.flag(HAS_SPACES_OR_NEWLINES)
    }

    #[must_use]
    pub fn entropy(&self) -> f64 {
        self.get(ENTROPY).and_then(|value| value.as_real()).unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_even_weight(&self) -> bool {
        self.flag(IS_EVEN_WEIGHT)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_probe_names_unique() {
        let names: HashSet<_> = PROBES.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PROBES.len());
    }

    #[test]
    fn test_profile_header_across_chunks() {
        let mut profile = ContentProfile::new();
        profile.update(b"\x89P");
        profile.update(b"NG\r\n");
        profile.update(b"\x1a\nIHDR");
        assert_eq!(profile.header(), &crate::signatures::PNG_SIGNATURE);
        assert_eq!(profile.len(), 12);
        assert!(profile.has_line_break());
    }

    #[test]
    fn test_vector_order_matches_probes() {
        let vector = FeatureVector::from_profile(&ContentProfile::from_bytes(b"RIFF...."));
        let names: Vec<_> = vector.names().collect();
        let expected: Vec<_> = PROBES.iter().map(|p| p.name).collect();
        assert_eq!(names, expected);
        assert!(vector.is_wav());
    }

    #[test]
    fn test_display_lists_features_in_order() {
        let vector = FeatureVector::from_profile(&ContentProfile::from_bytes(b"ab"));
        let text = vector.to_string();
        assert!(text.starts_with("{is_mp3: false, is_mp4: false"));
        assert!(text.ends_with("entropy: 1, is_even_weight: true}"));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(FeatureValue::Flag(true).as_flag(), Some(true));
        assert_eq!(FeatureValue::Flag(true).as_real(), None);
        assert_eq!(FeatureValue::Real(2.5).as_real(), Some(2.5));
    }
}
