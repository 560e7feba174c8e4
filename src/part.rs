// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MBR partition table handling.
//!
//! The engine manages exactly one partition of a disk whose
//! first sector holds a classic MBR: a 446-byte boot area, four
//! 16-byte partition entries, and the 0xAA55 boot signature.
//! Only the starting LBA and sector count of an entry matter to
//! the filesystem; the CHS fields are carried so that a parsed
//! table can be written back byte-for-byte.

use crate::block::{BLOCK_SIZE, Block};
use crate::result::{Error, Result};
use bitstruct::bitstruct;

/// Number of entries in the partition table.
pub const NPARTS: usize = 4;

/// Size of one partition table entry, in bytes.
const ENTRY_SIZE: usize = 16;

/// Byte offset of the partition table within the MBR sector.
const TABLE_OFFSET: usize = BLOCK_SIZE - 2 - NPARTS * ENTRY_SIZE;

/// Boot signature held in the last two bytes of the MBR.
const BOOT_SIG: u16 = 0xAA55;

bitstruct! {
    /// A packed cylinder/head/sector address as stored in a
    /// partition table entry.  The fields straddle byte
    /// boundaries, so the entry codec assembles these three
    /// bytes with explicit shifts rather than trusting any
    /// in-memory struct layout.
    #[derive(Clone, Copy)]
    pub struct Chs(u32) {
        cylinder: u8 = 0..8;
        head: u16 = 8..18;
        sector: u8 = 18..24;
    }
}

impl Default for Chs {
    fn default() -> Chs {
        Chs(0)
    }
}

impl PartialEq for Chs {
    fn eq(&self, other: &Chs) -> bool {
        self.0 == other.0
    }
}

impl Eq for Chs {}

impl core::fmt::Debug for Chs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Chs({}/{}/{})",
            self.cylinder(),
            self.head(),
            self.sector()
        )
    }
}

impl Chs {
    fn from_bytes(bs: [u8; 3]) -> Chs {
        Chs(u32::from(bs[0]) | u32::from(bs[1]) << 8 | u32::from(bs[2]) << 16)
    }

    fn to_bytes(self) -> [u8; 3] {
        let raw = self.0;
        [raw as u8, (raw >> 8) as u8, (raw >> 16) as u8]
    }
}

/// One entry of the MBR partition table.  `start` is the
/// absolute LBA of the partition's first block; `nsectors` is
/// its total length in blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub status: u8,
    pub chs_first: Chs,
    pub sysid: u8,
    pub chs_last: Chs,
    pub start: u32,
    pub nsectors: u32,
}

impl Partition {
    /// Returns a minimal descriptor for a partition of
    /// `nsectors` blocks starting at LBA `start`.  Useful for
    /// hosts that address a raw image without a partition
    /// table.
    pub fn new(start: u32, nsectors: u32) -> Partition {
        Partition { sysid: 0x7f, start, nsectors, ..Partition::default() }
    }

    /// An entry with a zero system id marks an unused slot.
    pub fn is_empty(&self) -> bool {
        self.sysid == 0
    }

    /// Decodes one 16-byte table entry.
    pub fn from_bytes(bs: &[u8; ENTRY_SIZE]) -> Partition {
        Partition {
            status: bs[0],
            chs_first: Chs::from_bytes([bs[1], bs[2], bs[3]]),
            sysid: bs[4],
            chs_last: Chs::from_bytes([bs[5], bs[6], bs[7]]),
            start: u32::from_le_bytes([bs[8], bs[9], bs[10], bs[11]]),
            nsectors: u32::from_le_bytes([bs[12], bs[13], bs[14], bs[15]]),
        }
    }

    /// Encodes this entry into its 16-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut bs = [0u8; ENTRY_SIZE];
        bs[0] = self.status;
        bs[1..4].copy_from_slice(&self.chs_first.to_bytes());
        bs[4] = self.sysid;
        bs[5..8].copy_from_slice(&self.chs_last.to_bytes());
        bs[8..12].copy_from_slice(&self.start.to_le_bytes());
        bs[12..16].copy_from_slice(&self.nsectors.to_le_bytes());
        bs
    }

    /// Extracts the four-entry partition table from an MBR
    /// sector, validating the boot signature.
    pub fn table(mbr: &Block) -> Result<[Partition; NPARTS]> {
        if mbr.get_u16(BLOCK_SIZE - 2) != BOOT_SIG {
            return Err(Error::NoMbr);
        }
        let mut table = [Partition::default(); NPARTS];
        let bytes = mbr.as_bytes();
        for (i, slot) in table.iter_mut().enumerate() {
            let off = TABLE_OFFSET + i * ENTRY_SIZE;
            let entry: &[u8; ENTRY_SIZE] =
                bytes[off..off + ENTRY_SIZE].try_into().unwrap();
            *slot = Partition::from_bytes(entry);
        }
        Ok(table)
    }
}
