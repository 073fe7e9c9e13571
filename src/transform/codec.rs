use std::fmt;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::error::{ProbeError, Result};

const XZ_PRESET: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    /// DEFLATE with zlib framing.
    Deflate,
    /// LZMA2 in an xz container.
    Lzma,
}

impl Codec {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Lzma => "lzma",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn compress(codec: Codec, data: &[u8]) -> Result<Vec<u8>> {
    match codec {
        Codec::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).map_err(ProbeError::Compression)?;
            encoder.finish().map_err(ProbeError::Compression)
        }
        Codec::Lzma => {
            let mut encoder = XzEncoder::new(Vec::new(), XZ_PRESET);
            encoder.write_all(data).map_err(ProbeError::Compression)?;
            encoder.finish().map_err(ProbeError::Compression)
        }
    }
}

pub fn decompress(codec: Codec, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let read = match codec {
        Codec::Deflate => ZlibDecoder::new(data).read_to_end(&mut out),
        Codec::Lzma => XzDecoder::new(data).read_to_end(&mut out),
    };
    read.map_err(ProbeError::Compression)?;
    Ok(out)
}
