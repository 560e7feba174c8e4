// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The unit of storage is a single 512-byte block, addressed by
//! an absolute LBA on the underlying device.  One block is
//! interpreted several ways: as the superblock, as raw bytes,
//! as an array of 128 little-endian block pointers, as an array
//! of 8 inodes, or as an array of 32 directory entries.  Each
//! view is an explicit accessor with explicit endianness, so
//! that images written on one machine read back identically on
//! another.

/// The size of a device block, in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Number of block pointers held by one block, when viewed as
/// an indirect block.
pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / core::mem::size_of::<u32>();

/// A single device block.
#[derive(Clone)]
#[repr(transparent)]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    /// A block of all zeroes.
    pub const ZEROED: Block = Block([0u8; BLOCK_SIZE]);

    pub fn new() -> Block {
        Self::ZEROED
    }

    /// Returns the raw byte view of this block.
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.0
    }

    /// Reads the little-endian u16 at the given byte offset.
    pub(crate) fn get_u16(&self, off: usize) -> u16 {
        u16::from_le_bytes([self.0[off], self.0[off + 1]])
    }

    /// Reads the little-endian u32 at the given byte offset.
    pub(crate) fn get_u32(&self, off: usize) -> u32 {
        u32::from_le_bytes([
            self.0[off],
            self.0[off + 1],
            self.0[off + 2],
            self.0[off + 3],
        ])
    }

    pub(crate) fn put_u16(&mut self, off: usize, val: u16) {
        self.0[off..off + 2].copy_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn put_u32(&mut self, off: usize, val: u32) {
        self.0[off..off + 4].copy_from_slice(&val.to_le_bytes());
    }

    /// Returns the `i`th entry of the block-pointer view.
    pub(crate) fn ptr(&self, i: usize) -> u32 {
        assert!(i < PTRS_PER_BLOCK);
        self.get_u32(i * 4)
    }

    /// Sets the `i`th entry of the block-pointer view.
    pub(crate) fn set_ptr(&mut self, i: usize, val: u32) {
        assert!(i < PTRS_PER_BLOCK);
        self.put_u32(i * 4, val);
    }
}

impl Default for Block {
    fn default() -> Block {
        Block::new()
    }
}

/// The block-device contract the engine is written against.
///
/// Transfers are always whole blocks and are infallible: a
/// device that cannot complete a transfer has no useful way to
/// continue, and is expected to panic upstream.  The engine
/// issues no transfer outside the partition it was given.
pub trait BlockIo {
    /// Reads the block at the given absolute LBA into `buf`.
    fn read_block(&mut self, lba: u32, buf: &mut Block);

    /// Writes `buf` to the block at the given absolute LBA.
    fn write_block(&mut self, lba: u32, buf: &Block);
}

impl<T: BlockIo + ?Sized> BlockIo for &mut T {
    fn read_block(&mut self, lba: u32, buf: &mut Block) {
        (**self).read_block(lba, buf)
    }

    fn write_block(&mut self, lba: u32, buf: &Block) {
        (**self).write_block(lba, buf)
    }
}

/// Convenience for the common read-a-block pattern.
pub(crate) fn read_from<D: BlockIo>(dev: &mut D, lba: u32) -> Block {
    let mut b = Block::new();
    dev.read_block(lba, &mut b);
    b
}
