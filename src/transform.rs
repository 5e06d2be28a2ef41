//! Streaming byte transforms used by the key formats: CRC32 and AES-256-ECB.

use alloc::vec::Vec;

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};
use crate::hash::Hash32;

/// A byte-stream transform: construct, feed with [`Transform::update`], then
/// collect the result with [`Transform::finish`].
pub trait Transform {
    /// What the transform produces.
    type Output;

    /// Feeds more input.
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Consumes the transform and returns its output.
    fn finish(self) -> Result<Self::Output>;
}

const CRC32_POLY: u32 = 0xEDB8_8320;

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { CRC32_POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = crc32_table();

/// Reflected CRC-32 (IEEE 802.3).
#[derive(Debug, Clone)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Starts a new checksum.
    pub fn new() -> Self {
        Crc32 { state: !0 }
    }

    fn feed(&mut self, data: &[u8]) {
        self.state = data.iter().fold(self.state, |c, &b| {
            CRC32_TABLE[((c ^ u32::from(b)) & 0xFF) as usize] ^ (c >> 8)
        });
    }

    /// Checksum of everything fed so far.
    pub fn value(&self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Crc32::new()
    }
}

impl Transform for Crc32 {
    type Output = u32;

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.feed(data);
        Ok(())
    }

    fn finish(self) -> Result<u32> {
        Ok(self.value())
    }
}

/// CRC-32 of `data` in one call.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.feed(data);
    crc.value()
}

/// Direction of an [`Aes256Ecb`] transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Plaintext in, ciphertext out.
    Encrypt,
    /// Ciphertext in, plaintext out.
    Decrypt,
}

/// AES-256 in ECB mode over whole 16-byte blocks.
///
/// Input may arrive in pieces of any size, but the total must be a multiple
/// of the block size.
pub struct Aes256Ecb {
    cipher: Aes256,
    direction: Direction,
    pending: Zeroizing<Vec<u8>>,
    output: Zeroizing<Vec<u8>>,
}

impl Aes256Ecb {
    /// Block size in bytes.
    pub const BLOCK_SIZE: usize = 16;

    /// Keys the cipher with the 32 bytes of `key`.
    pub fn new(key: &Hash32, direction: Direction) -> Self {
        Aes256Ecb {
            cipher: Aes256::new(GenericArray::from_slice(key.as_bytes())),
            direction,
            pending: Zeroizing::new(Vec::with_capacity(Self::BLOCK_SIZE)),
            output: Zeroizing::new(Vec::new()),
        }
    }

    fn process(&mut self, block: &mut [u8]) {
        let block = Block::from_mut_slice(block);
        match self.direction {
            Direction::Encrypt => self.cipher.encrypt_block(block),
            Direction::Decrypt => self.cipher.decrypt_block(block),
        }
    }
}

impl Transform for Aes256Ecb {
    type Output = Zeroizing<Vec<u8>>;

    fn update(&mut self, mut data: &[u8]) -> Result<()> {
        if !self.pending.is_empty() {
            let take = (Self::BLOCK_SIZE - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.pending.len() < Self::BLOCK_SIZE {
                return Ok(());
            }
            let mut block = [0u8; Self::BLOCK_SIZE];
            block.copy_from_slice(&self.pending);
            self.pending.zeroize();
            self.process(&mut block);
            self.output.extend_from_slice(&block);
            block.zeroize();
        }

        let whole = data.len() - data.len() % Self::BLOCK_SIZE;
        let start = self.output.len();
        self.output.extend_from_slice(&data[..whole]);
        let mut out = core::mem::take(&mut *self.output);
        for block in out[start..].chunks_exact_mut(Self::BLOCK_SIZE) {
            self.process(block);
        }
        *self.output = out;
        self.pending.extend_from_slice(&data[whole..]);
        Ok(())
    }

    fn finish(self) -> Result<Zeroizing<Vec<u8>>> {
        if !self.pending.is_empty() {
            return Err(Error::InvalidParam);
        }
        Ok(self.output)
    }
}

/// Encrypts or decrypts `data` in one call.
pub fn aes256_ecb(key: &Hash32, direction: Direction, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let mut aes = Aes256Ecb::new(key, direction);
    aes.update(data)?;
    aes.finish()
}
