// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The filesystem handle.
//!
//! All engine state lives behind one `FileSystem` value: the
//! injected block device, the superblock cached at mount time,
//! the open-file table, and an optional diagnostics console.
//! There is no global state and no locking; the engine assumes
//! exclusive, single-threaded access to its partition for the
//! lifetime of the handle.  Every operation is synchronous and
//! issues whole-block transfers through the device trait.
//!
//! Mounting validates the superblock magic, so a handle is
//! proof that the partition was formatted: the "initialized"
//! flag of traditional implementations is carried by the type
//! system instead of a runtime check.

use crate::block::{Block, BlockIo};
use crate::file::{NFILES, OpenFile};
use crate::inode::{FileType, NULL_INUM, ROOT_INUM};
use crate::part::Partition;
use crate::result::{Error, Result};
use crate::sb::SuperBlock;
use core::fmt;

/// A diagnostics console that discards everything written to
/// it.  The default when no console is injected; diagnostics
/// never affect engine behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullConsole;

impl fmt::Write for NullConsole {
    fn write_str(&mut self, _: &str) -> fmt::Result {
        Ok(())
    }
}

/// Writes one diagnostic line to the handle's console.
macro_rules! diag {
    ($fs:expr, $($args:tt)*) => {
        $fs.diagln(format_args!($($args)*))
    };
}
pub(crate) use diag;

/// The filesystem engine, generic over the injected block
/// device `D` and diagnostics console `C`.
pub struct FileSystem<D, C = NullConsole> {
    pub(crate) dev: D,
    pub(crate) cons: C,
    pub(crate) sb: SuperBlock,
    pub(crate) files: [OpenFile; NFILES],
}

impl<D: BlockIo> FileSystem<D, NullConsole> {
    /// Mounts the filesystem occupying `part` on `dev`.
    /// Fails with `BadMagic` if the partition has not been
    /// formatted; the caller may then `format` it and retry.
    pub fn new(dev: D, part: &Partition) -> Result<FileSystem<D>> {
        Self::with_console(dev, NullConsole, part)
    }

    /// Builds a fresh, empty filesystem on `part`: zeroes every
    /// block, writes the superblock, and reserves inode 0 (the
    /// null sentinel) and inode 1 (the root directory).  The
    /// root is left with no entries and a link count of zero;
    /// nothing refers to it by name.
    pub fn format(dev: &mut D, part: &Partition) -> Result<()> {
        let sb = SuperBlock::new(part)?;
        for i in 0..sb.nblock_tot {
            dev.write_block(sb.start + i, &Block::ZEROED);
        }
        let mut b = Block::new();
        sb.store(&mut b);
        dev.write_block(sb.start, &b);
        let mut fs = FileSystem {
            dev,
            cons: NullConsole,
            sb,
            files: [OpenFile::FREE; NFILES],
        };
        let null = fs.alloc_inode(FileType::Dir)?;
        let root = fs.alloc_inode(FileType::Dir)?;
        if null != NULL_INUM || root != ROOT_INUM {
            return Err(Error::Corrupt);
        }
        Ok(())
    }
}

impl<D: BlockIo, C: fmt::Write> FileSystem<D, C> {
    /// Mounts with an injected diagnostics console.
    pub fn with_console(
        mut dev: D,
        cons: C,
        part: &Partition,
    ) -> Result<FileSystem<D, C>> {
        let sb = SuperBlock::read(&mut dev, part)?;
        Ok(FileSystem { dev, cons, sb, files: [OpenFile::FREE; NFILES] })
    }

    /// Returns the superblock cached at mount time.
    pub fn superblock(&self) -> &SuperBlock {
        &self.sb
    }

    /// Releases the handle, returning the underlying device.
    pub fn into_device(self) -> D {
        self.dev
    }

    pub(crate) fn diagln(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.cons.write_fmt(args);
        let _ = self.cons.write_str("\n");
    }
}
