//! Deterministic byte generator built on an MD5 hash chain.
//!
//! The generator holds a 16-byte pool. Absorbing salt replaces the pool with
//! `MD5(pool || salt)`; each output step replaces it with `MD5(pool)` and
//! emits the new pool. The same salts always yield the same stream, which the
//! primality tester and the signature padding rely on.

use md5::{Digest, Md5};
use rand_core::{impls, Error as RngError, RngCore};
use zeroize::Zeroize;

/// Size of the internal pool in bytes.
pub const POOL_SIZE: usize = 16;

/// MD5 chaining generator.
#[derive(Clone, Default)]
pub struct Prng {
    pool: [u8; POOL_SIZE],
}

impl Prng {
    /// Creates a generator with an all-zero pool.
    pub fn new() -> Self {
        Prng::default()
    }

    /// Creates a generator and absorbs `salt`.
    pub fn with_salt(salt: &[u8]) -> Self {
        let mut prng = Prng::new();
        prng.absorb(salt);
        prng
    }

    /// Mixes `salt` into the pool. An empty salt leaves it unchanged.
    pub fn absorb(&mut self, salt: &[u8]) {
        if salt.is_empty() {
            return;
        }
        let mut hasher = Md5::new();
        hasher.update(self.pool);
        hasher.update(salt);
        self.pool.copy_from_slice(&hasher.finalize());
    }

    /// Fills `out` with the next bytes of the stream.
    pub fn fill(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(POOL_SIZE) {
            let next = Md5::digest(self.pool);
            self.pool.copy_from_slice(&next);
            chunk.copy_from_slice(&self.pool[..chunk.len()]);
        }
    }
}

impl RngCore for Prng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RngError> {
        self.fill(dest);
        Ok(())
    }
}

impl Zeroize for Prng {
    fn zeroize(&mut self) {
        self.pool.zeroize();
    }
}

impl Drop for Prng {
    fn drop(&mut self) {
        self.zeroize();
    }
}
