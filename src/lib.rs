// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small Unix-style filesystem engine over a raw block
//! device.
//!
//! The on-disk format is a single partition laid out as
//! `superblock | log | inode table | bitmap | data`, with
//! 512-byte blocks throughout: a fixed table of 200 inodes,
//! one bitmap block tracking the data region, and per-file
//! block trees of ten direct, two singly-indirect, and one
//! doubly-indirect pointer, giving files of up to a little over
//! eight megabytes with full sparse-file support.  The log
//! region is reserved and unused; there is no journaling, no
//! caching, and no locking.
//!
//! The engine owns no hardware.  It is written against the
//! [`BlockIo`] trait and an optional diagnostics console, so
//! the same code runs above an IDE driver in a bootloader, a
//! file-backed image in a host tool, or an in-memory fake in
//! the tests.  Three layers stack on top of the device:
//!
//! 1. the inode layer: allocation, teardown, and byte-range
//!    reads and writes that grow a file's pointer tree on
//!    demand ([`FileSystem::inode_read`],
//!    [`FileSystem::inode_write`]);
//! 2. the path layer: hierarchical names mapped to inodes,
//!    with create, link, and unlink ([`FileSystem::lookup`],
//!    [`FileSystem::mknod`], [`FileSystem::link`],
//!    [`FileSystem::unlink`]);
//! 3. the open-file layer: a small descriptor table mapping
//!    `(path, mode)` to an inode and cursor
//!    ([`FileSystem::open`] and friends).

#![cfg_attr(not(any(test, clippy)), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]

mod bitmap;
mod block;
mod dir;
mod file;
mod fs;
mod inode;
mod part;
mod result;
mod sb;

pub use block::{BLOCK_SIZE, Block, BlockIo, PTRS_PER_BLOCK};
pub use dir::{DIRENTS_PER_BLOCK, DirEntry, MAX_NAME, MAX_PATH, ReadDir,
    split_path};
pub use file::{FileStat, NFILES, OpenMode};
pub use fs::{FileSystem, NullConsole};
pub use inode::{DInode, FileType, INODES_PER_BLOCK, MAX_FILE_SIZE, NDINDIRECT,
    NDIRECT, NINDIRECT, NPTRS, NULL_INUM, ROOT_INUM};
pub use part::{Chs, NPARTS, Partition};
pub use result::{Error, Result};
pub use sb::{FS_MAGIC, NBLOCKS_LOG, NINODES, SuperBlock};

#[cfg(test)]
mod fakes;
