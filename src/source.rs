//! Byte sources accepted by the analyzer.
//!
//! The analyzer only needs a finite, ordered byte sequence. A source is never
//! written to; a path is opened read-only and read exactly once.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::{ProbeError, Result};

#[derive(Debug, Clone, Copy)]
pub enum ByteSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> ByteSource<'a> {
    /// Human-readable label used in logs and error messages.
    #[must_use]
    pub fn label(&self) -> Cow<'a, str> {
        match *self {
            Self::Path(path) => path.to_string_lossy(),
            Self::Bytes(data) => Cow::Owned(format!("<memory: {} bytes>", data.len())),
        }
    }

    /// Size of the source without reading its content.
    pub fn len(&self) -> Result<u64> {
        match *self {
            Self::Path(path) => fs::metadata(path)
                .map(|meta| meta.len())
                .map_err(|err| ProbeError::io(path.to_string_lossy(), err)),
            Self::Bytes(data) => Ok(data.len() as u64),
        }
    }

    /// Reads the whole source into memory. In-memory sources are borrowed.
    pub fn load(&self) -> Result<Cow<'a, [u8]>> {
        match *self {
            Self::Path(path) => read_file(path).map(Cow::Owned),
            Self::Bytes(data) => Ok(Cow::Borrowed(data)),
        }
    }

    /// Opens the source as a sequential reader.
    pub fn open(&self) -> Result<Box<dyn Read + 'a>> {
        match *self {
            Self::Path(path) => {
                let file =
                    File::open(path).map_err(|err| ProbeError::io(path.to_string_lossy(), err))?;
                Ok(Box::new(file))
            }
            Self::Bytes(data) => Ok(Box::new(data)),
        }
    }
}

impl<'a> From<&'a Path> for ByteSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a std::path::PathBuf> for ByteSource<'a> {
    fn from(path: &'a std::path::PathBuf) -> Self {
        Self::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for ByteSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::Bytes(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteSource<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        Self::Bytes(data.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for ByteSource<'a> {
    fn from(data: &'a Vec<u8>) -> Self {
        Self::Bytes(data.as_slice())
    }
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| ProbeError::io(path.to_string_lossy(), err))
}
