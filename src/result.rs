// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;

/// Various errors
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum Error {
    BadMagic,
    NoMbr,
    BadInum,
    BadFileType,
    BadPath,
    PathTooLong,
    NameTooLong,
    NotFound,
    NotDir,
    Exists,
    NotEmpty,
    NoSpace,
    TooBig,
    BadFd,
    FileTableFull,
    NotReadable,
    NotWritable,
    BadArgs,
    Corrupt,
}

impl Error {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadMagic => "Bad magic number in superblock",
            Self::NoMbr => "Missing MBR signature",
            Self::BadInum => "Inode number out of range",
            Self::BadFileType => "Invalid file type",
            Self::BadPath => "Invalid path",
            Self::PathTooLong => "Path too long",
            Self::NameTooLong => "Name too long",
            Self::NotFound => "No such file or directory",
            Self::NotDir => "Not a directory",
            Self::Exists => "File exists",
            Self::NotEmpty => "Directory not empty",
            Self::NoSpace => "No space left on device",
            Self::TooBig => "Transfer size exceeds maximum",
            Self::BadFd => "Bad file descriptor",
            Self::FileTableFull => "Open file table is full",
            Self::NotReadable => "File not open for reading",
            Self::NotWritable => "File not open for writing",
            Self::BadArgs => "Bad arguments",
            Self::Corrupt => "Filesystem corruption detected",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> core::result::Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
