// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Open files.
//!
//! Callers see file descriptors instead of raw inodes: a
//! descriptor is an index into a fixed table of slots, each
//! holding an inode number, a byte offset, and the open mode.
//! A slot whose inode is the null sentinel is free.  The table
//! holds no reference to the inode beyond its number, so a
//! descriptor left open across an unlink of its last name
//! dangles; nothing here prevents that.

use crate::block::BlockIo;
use crate::fs::{FileSystem, diag};
use crate::inode::{FileType, NULL_INUM};
use crate::result::{Error, Result};
use bitflags::bitflags;
use core::fmt;

/// Number of open-file slots.
pub const NFILES: usize = 16;

bitflags! {
    /// How a file is opened.  `RDONLY` is the empty set;
    /// `RDWR` is its own bit rather than `WRONLY`'s, so a
    /// write-only descriptor is exactly one that intersects
    /// `WRONLY`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct OpenMode: u32 {
        const WRONLY = 1;
        const RDWR = 2;
    }
}

impl OpenMode {
    pub const RDONLY: OpenMode = OpenMode::empty();

    /// Readable unless opened write-only.
    fn readable(self) -> bool {
        !self.intersects(OpenMode::WRONLY)
    }

    /// Writable unless opened read-only.
    fn writable(self) -> bool {
        !self.is_empty()
    }
}

/// One slot of the open-file table.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenFile {
    pub(crate) inum: u32,
    pub(crate) off: u32,
    pub(crate) mode: OpenMode,
}

impl OpenFile {
    /// A free slot.
    pub(crate) const FREE: OpenFile =
        OpenFile { inum: NULL_INUM, off: 0, mode: OpenMode::RDONLY };
}

/// File metadata reported by [`FileSystem::stat`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileStat {
    pub typ: FileType,
    pub size: u32,
    pub linkcnt: u16,
}

impl<D: BlockIo, C: fmt::Write> FileSystem<D, C> {
    /// Opens the file at `path`, returning a file descriptor
    /// positioned at offset zero.  Fails when the path does not
    /// resolve or every slot is taken.
    pub fn open(&mut self, path: &str, mode: OpenMode) -> Result<usize> {
        let Some(fd) =
            self.files.iter().position(|f| f.inum == NULL_INUM)
        else {
            diag!(self, "open: out of file descriptors");
            return Err(Error::FileTableFull);
        };
        let inum = self.lookup(path, false)?;
        self.files[fd] = OpenFile { inum, off: 0, mode };
        Ok(fd)
    }

    /// Sets the descriptor's offset, absolutely.  Seeking past
    /// the end of the file is allowed; a later write there
    /// leaves a hole.
    pub fn seek(&mut self, fd: usize, off: u32) -> Result<()> {
        self.slot(fd)?.off = off;
        Ok(())
    }

    /// Reads from the descriptor's current offset, advancing it
    /// by the number of bytes read.
    pub fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize> {
        let file = *self.slot(fd)?;
        if !file.mode.readable() {
            return Err(Error::NotReadable);
        }
        let n = self.inode_read(file.inum, buf, file.off)?;
        self.files[fd].off += n as u32;
        Ok(n)
    }

    /// Writes at the descriptor's current offset, advancing it
    /// by the number of bytes written.
    pub fn write(&mut self, fd: usize, buf: &[u8]) -> Result<usize> {
        let file = *self.slot(fd)?;
        if !file.mode.writable() {
            return Err(Error::NotWritable);
        }
        let n = self.inode_write(file.inum, buf, file.off)?;
        self.files[fd].off += n as u32;
        Ok(n)
    }

    /// Reports the type, size, and link count of the open file.
    pub fn stat(&mut self, fd: usize) -> Result<FileStat> {
        let file = *self.slot(fd)?;
        let di = self.read_inode(file.inum)?;
        Ok(FileStat {
            typ: di.file_type()?,
            size: di.size,
            linkcnt: di.linkcnt,
        })
    }

    /// Releases the descriptor.
    pub fn close(&mut self, fd: usize) -> Result<()> {
        self.slot(fd)?.inum = NULL_INUM;
        Ok(())
    }

    /// Returns the open slot behind `fd`, rejecting stale and
    /// out-of-range descriptors.
    fn slot(&mut self, fd: usize) -> Result<&mut OpenFile> {
        match self.files.get_mut(fd) {
            Some(f) if f.inum != NULL_INUM => Ok(f),
            _ => Err(Error::BadFd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::mkfs;

    #[test]
    fn descriptors_are_allocated_lowest_first() {
        let mut fs = mkfs(200);
        fs.mknod("/a", FileType::Regular).unwrap();
        fs.mknod("/b", FileType::Regular).unwrap();
        assert_eq!(fs.open("/a", OpenMode::RDONLY).unwrap(), 0);
        assert_eq!(fs.open("/b", OpenMode::RDONLY).unwrap(), 1);
        fs.close(0).unwrap();
        assert_eq!(fs.open("/b", OpenMode::RDONLY).unwrap(), 0);
    }

    #[test]
    fn open_fails_on_missing_files_and_full_tables() {
        let mut fs = mkfs(200);
        assert_eq!(fs.open("/nope", OpenMode::RDONLY), Err(Error::NotFound));
        fs.mknod("/a", FileType::Regular).unwrap();
        for _ in 0..NFILES {
            fs.open("/a", OpenMode::RDONLY).unwrap();
        }
        assert_eq!(
            fs.open("/a", OpenMode::RDONLY),
            Err(Error::FileTableFull)
        );
    }

    #[test]
    fn write_then_read_through_descriptors() {
        let mut fs = mkfs(200);
        fs.mknod("/a", FileType::Regular).unwrap();
        let fd = fs.open("/a", OpenMode::WRONLY).unwrap();
        assert_eq!(fd, 0);
        assert_eq!(fs.write(fd, b"hello").unwrap(), 5);
        fs.close(fd).unwrap();

        let fd = fs.open("/a", OpenMode::RDONLY).unwrap();
        let mut buf = [0u8; 10];
        assert_eq!(fs.read(fd, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        // The offset advanced; the next read sees end of file.
        assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);
    }

    #[test]
    fn modes_gate_reads_and_writes() {
        let mut fs = mkfs(200);
        fs.mknod("/a", FileType::Regular).unwrap();
        let mut buf = [0u8; 4];

        let rd = fs.open("/a", OpenMode::RDONLY).unwrap();
        assert_eq!(fs.write(rd, b"no"), Err(Error::NotWritable));
        assert_eq!(fs.read(rd, &mut buf).unwrap(), 0);

        let wr = fs.open("/a", OpenMode::WRONLY).unwrap();
        assert_eq!(fs.read(wr, &mut buf), Err(Error::NotReadable));
        assert_eq!(fs.write(wr, b"ok").unwrap(), 2);

        let rw = fs.open("/a", OpenMode::RDWR).unwrap();
        assert_eq!(fs.write(rw, b"hi").unwrap(), 2);
        fs.seek(rw, 0).unwrap();
        assert_eq!(fs.read(rw, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"hi");
    }

    #[test]
    fn seek_past_the_end_leaves_a_hole() {
        let mut fs = mkfs(200);
        fs.mknod("/s", FileType::Regular).unwrap();
        let fd = fs.open("/s", OpenMode::RDWR).unwrap();
        fs.seek(fd, 100_000).unwrap();
        assert_eq!(fs.write(fd, b"X").unwrap(), 1);
        assert_eq!(fs.stat(fd).unwrap().size, 100_001);

        fs.seek(fd, 0).unwrap();
        let mut zeros = vec![0xffu8; 100_000];
        assert_eq!(fs.read(fd, &mut zeros).unwrap(), 100_000);
        assert!(zeros.iter().all(|&b| b == 0));
        let mut x = [0u8; 8];
        assert_eq!(fs.read(fd, &mut x).unwrap(), 1);
        assert_eq!(x[0], b'X');
    }

    #[test]
    fn stat_reflects_links_and_type() {
        let mut fs = mkfs(200);
        fs.mknod("/a", FileType::Regular).unwrap();
        fs.mknod("/d", FileType::Dir).unwrap();
        fs.link("/b", "/a").unwrap();

        let fa = fs.open("/a", OpenMode::RDONLY).unwrap();
        let fb = fs.open("/b", OpenMode::RDONLY).unwrap();
        assert_eq!(fs.stat(fa).unwrap().linkcnt, 2);
        assert_eq!(fs.stat(fa).unwrap(), fs.stat(fb).unwrap());

        let fd = fs.open("/d", OpenMode::RDONLY).unwrap();
        assert_eq!(fs.stat(fd).unwrap().typ, FileType::Dir);

        fs.unlink("/a").unwrap();
        assert_eq!(fs.stat(fb).unwrap().linkcnt, 1);
    }

    #[test]
    fn stale_and_bogus_descriptors_are_rejected() {
        let mut fs = mkfs(200);
        fs.mknod("/a", FileType::Regular).unwrap();
        let fd = fs.open("/a", OpenMode::RDONLY).unwrap();
        fs.close(fd).unwrap();
        assert_eq!(fs.close(fd), Err(Error::BadFd));
        let mut buf = [0u8; 1];
        assert_eq!(fs.read(fd, &mut buf), Err(Error::BadFd));
        assert_eq!(fs.seek(fd, 0), Err(Error::BadFd));
        assert_eq!(fs.stat(NFILES), Err(Error::BadFd));
        assert_eq!(fs.write(99, b"x"), Err(Error::BadFd));
    }
}
