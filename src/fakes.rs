// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test doubles: an in-memory block device and helpers for
//! inspecting the disk image behind a mounted filesystem.

use crate::block::{BLOCK_SIZE, Block, BlockIo};
use crate::fs::FileSystem;
use crate::part::Partition;

/// An in-memory disk, addressed from LBA 0.  Transfers outside
/// the disk panic, per the device contract.
pub(crate) struct RamDisk {
    blocks: Vec<[u8; BLOCK_SIZE]>,
}

impl RamDisk {
    pub(crate) fn new(nblocks: usize) -> RamDisk {
        RamDisk { blocks: vec![[0u8; BLOCK_SIZE]; nblocks] }
    }

    /// Raw view of one block, for asserting on disk state.
    pub(crate) fn block(&self, lba: u32) -> &[u8; BLOCK_SIZE] {
        &self.blocks[lba as usize]
    }
}

impl BlockIo for RamDisk {
    fn read_block(&mut self, lba: u32, buf: &mut Block) {
        buf.as_bytes_mut().copy_from_slice(&self.blocks[lba as usize]);
    }

    fn write_block(&mut self, lba: u32, buf: &Block) {
        self.blocks[lba as usize].copy_from_slice(buf.as_bytes());
    }
}

/// Formats a fresh filesystem onto a RamDisk of `nblocks`
/// blocks and mounts it.
pub(crate) fn mkfs(nblocks: u32) -> FileSystem<RamDisk> {
    let mut disk = RamDisk::new(nblocks as usize);
    let part = Partition::new(0, nblocks);
    FileSystem::format(&mut disk, &part).unwrap();
    FileSystem::new(disk, &part).unwrap()
}

/// Number of data blocks currently marked allocated in the
/// bitmap.
pub(crate) fn allocated_blocks(fs: &FileSystem<RamDisk>) -> u32 {
    let sb = fs.superblock();
    fs.dev.block(sb.sbitmap).iter().map(|b| b.count_ones()).sum()
}
