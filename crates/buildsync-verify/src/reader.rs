use std::io::{self, Read};

use crate::{ContentHash, Hasher, Result};

/// Streaming reader that hashes data as it passes through.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
        }
    }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

impl<R: Read, H: Hasher> VerifiedReader<R, H> {
    /// Drain whatever is left of the source and return its digest.
    pub fn digest(mut self) -> Result<ContentHash> {
        io::copy(&mut self, &mut io::sink())?;
        Ok(ContentHash::from_bytes(&self.hasher.finalize()))
    }
}
