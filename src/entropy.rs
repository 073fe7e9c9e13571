//! Byte histograms and Shannon entropy.
//!
//! Entropy is measured in bits per byte over the 256 possible byte values,
//! so every result lies in `[0, 8]`. The histogram can be fed incrementally,
//! which lets large inputs be measured in fixed-size chunks without holding
//! the whole content in memory.

pub const BYTE_VALUES: usize = 256;
pub const MAX_ENTROPY: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteHistogram {
    counts: [u64; BYTE_VALUES],
    total: u64,
}

impl ByteHistogram {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; BYTE_VALUES],
            total: 0,
        }
    }

    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut histogram = Self::new();
        histogram.update(data);
        histogram
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    pub fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
        self.total += other.total;
    }

    #[inline]
    #[must_use]
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct byte values seen at least once.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Shannon entropy of the counted bytes.
    ///
    /// An empty histogram has entropy `0.0`; there is no division by a zero
    /// length.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let len = self.total as f64;
        let mut entropy = 0.0;
        for &count in &self.counts {
            if count > 0 {
                let p = count as f64 / len;
                entropy -= p * p.log2();
            }
        }
        entropy.clamp(0.0, MAX_ENTROPY)
    }
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Shannon entropy of `data` in bits per byte.
#[must_use]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    ByteHistogram::from_bytes(data).entropy()
}
