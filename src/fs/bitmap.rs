use crate::fs::consts::{BITMAP_BYTES, MAX_BLOCKS};

/// Data block allocation map. Bit `n % 8` of byte `n / 8` set means block `n`
/// is in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBitmap {
    bits: [u8; BITMAP_BYTES],
}

impl BlockBitmap {
    pub fn new() -> Self {
        Self {
            bits: [0; BITMAP_BYTES],
        }
    }

    pub fn from_bytes(inp: &[u8]) -> Self {
        let mut bits = [0u8; BITMAP_BYTES];
        bits.copy_from_slice(&inp[..BITMAP_BYTES]);
        Self { bits }
    }

    pub fn as_bytes(&self) -> &[u8; BITMAP_BYTES] {
        &self.bits
    }

    pub fn is_used(&self, block: u32) -> bool {
        let block = block as usize;
        block < MAX_BLOCKS && self.bits[block / 8] & (1 << (block % 8)) != 0
    }

    pub fn set(&mut self, block: u32) {
        let block = block as usize;
        if block < MAX_BLOCKS {
            self.bits[block / 8] |= 1 << (block % 8);
        }
    }

    pub fn clear(&mut self, block: u32) {
        let block = block as usize;
        if block < MAX_BLOCKS {
            self.bits[block / 8] &= !(1 << (block % 8));
        }
    }

    /// First-fit: lowest free block, marked used on return.
    pub fn allocate(&mut self) -> Option<u32> {
        let block = (0..MAX_BLOCKS as u32).find(|&b| !self.is_used(b))?;
        self.set(block);
        Some(block)
    }

    pub fn used_count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for BlockBitmap {
    fn default() -> Self {
        Self::new()
    }
}
