#[cfg(feature = "sha1")]
use digest::Digest;

pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

#[cfg(feature = "sha1")]
pub struct Sha1Hasher(sha1::Sha1);

#[cfg(feature = "sha1")]
impl Hasher for Sha1Hasher {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

#[cfg(feature = "sha1")]
impl Default for Sha1Hasher {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "sha1")]
impl Sha1Hasher {
    pub fn new() -> Self { Self(sha1::Sha1::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { sha1::Sha1::digest(data).to_vec() }
}
