// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The superblock sits in the first block of the partition and
//! fixes the geometry of everything behind it:
//!
//!   superblock | log blocks | inode blocks | bitmap block | data blocks
//!
//! The log region is reserved for a future journal and is not
//! otherwise touched.  All `s*` fields are absolute LBAs on the
//! device, so the engine never adds the partition base itself.

use crate::block::{BLOCK_SIZE, Block, BlockIo, read_from};
use crate::inode::INODES_PER_BLOCK;
use crate::part::Partition;
use crate::result::{Error, Result};
use core::ops::Range;
use static_assertions::const_assert;

/// Number of blocks reserved for the (unused) log region.
pub const NBLOCKS_LOG: u32 = 30;

/// Number of inodes in the inode table, fixed at format time.
pub const NINODES: u32 = 200;

/// Magic number identifying a formatted partition.
pub const FS_MAGIC: u32 = 0xDEAD_BEEF;

/// Number of blocks holding the inode table.
pub const NBLOCKS_INODE: u32 = NINODES / INODES_PER_BLOCK as u32;

// The inode table must tile its blocks exactly.
const_assert!(NINODES % INODES_PER_BLOCK as u32 == 0);

/// Blocks that are not data: superblock, log, inode table, and
/// the bitmap block.
const OVERHEAD: u32 = 2 + NBLOCKS_LOG + NBLOCKS_INODE;

/// The free-data bitmap is a single block, which bounds how
/// many data blocks a partition may carry.
const MAX_NBLOCK_DAT: u32 = (BLOCK_SIZE * 8) as u32;

/// Superblock.
///
/// All fields are 32-bit and stored little-endian at the front
/// of the partition's first block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuperBlock {
    pub ninodes: u32,      // number of inodes in the table
    pub nblock_tot: u32,   // total blocks in the partition
    pub nblock_log: u32,   // blocks reserved for the log
    pub nblock_dat: u32,   // blocks in the data region
    pub nblock_inode: u32, // blocks holding the inode table
    pub start: u32,        // first LBA of the partition
    pub slog: u32,         // first LBA of the log region
    pub sinode: u32,       // first LBA of the inode table
    pub sbitmap: u32,      // LBA of the bitmap block
    pub sdata: u32,        // first LBA of the data region
    pub magic: u32,        // FS_MAGIC once formatted
}

impl SuperBlock {
    /// Computes the layout for a fresh filesystem covering the
    /// given partition.  Rejects partitions too small to hold
    /// the fixed regions plus at least one data block, and
    /// partitions with more data blocks than the single bitmap
    /// block can track.
    pub fn new(part: &Partition) -> Result<SuperBlock> {
        if part.nsectors <= OVERHEAD {
            return Err(Error::BadArgs);
        }
        let nblock_dat = part.nsectors - OVERHEAD;
        if nblock_dat > MAX_NBLOCK_DAT {
            return Err(Error::BadArgs);
        }
        let start = part.start;
        let slog = start + 1;
        let sinode = slog + NBLOCKS_LOG;
        let sbitmap = sinode + NBLOCKS_INODE;
        Ok(SuperBlock {
            ninodes: NINODES,
            nblock_tot: part.nsectors,
            nblock_log: NBLOCKS_LOG,
            nblock_dat,
            nblock_inode: NBLOCKS_INODE,
            start,
            slog,
            sinode,
            sbitmap,
            sdata: sbitmap + 1,
            magic: FS_MAGIC,
        })
    }

    /// Reads the superblock from the first block of the
    /// partition, validating the magic number.
    pub fn read<D: BlockIo>(dev: &mut D, part: &Partition) -> Result<SuperBlock> {
        let b = read_from(dev, part.start);
        let sb = SuperBlock::load(&b);
        if sb.magic != FS_MAGIC {
            return Err(Error::BadMagic);
        }
        Ok(sb)
    }

    /// Decodes the superblock view of a block.
    pub(crate) fn load(b: &Block) -> SuperBlock {
        SuperBlock {
            ninodes: b.get_u32(0),
            nblock_tot: b.get_u32(4),
            nblock_log: b.get_u32(8),
            nblock_dat: b.get_u32(12),
            nblock_inode: b.get_u32(16),
            start: b.get_u32(20),
            slog: b.get_u32(24),
            sinode: b.get_u32(28),
            sbitmap: b.get_u32(32),
            sdata: b.get_u32(36),
            magic: b.get_u32(40),
        }
    }

    /// Encodes this superblock into the front of a block.
    pub(crate) fn store(&self, b: &mut Block) {
        b.put_u32(0, self.ninodes);
        b.put_u32(4, self.nblock_tot);
        b.put_u32(8, self.nblock_log);
        b.put_u32(12, self.nblock_dat);
        b.put_u32(16, self.nblock_inode);
        b.put_u32(20, self.start);
        b.put_u32(24, self.slog);
        b.put_u32(28, self.sinode);
        b.put_u32(32, self.sbitmap);
        b.put_u32(36, self.sdata);
        b.put_u32(40, self.magic);
    }

    /// Inode number to the LBA of its inode-table block.
    pub(crate) fn itod(&self, inum: u32) -> u32 {
        self.sinode + inum / INODES_PER_BLOCK as u32
    }

    /// Offset of an inode within its inode-table block.
    pub(crate) fn itoo(&self, inum: u32) -> usize {
        inum as usize % INODES_PER_BLOCK
    }

    /// The LBA range of the data region.
    pub(crate) fn data_range(&self) -> Range<u32> {
        self.sdata..self.sdata + self.nblock_dat
    }
}
