// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The free-data-block bitmap.
//!
//! A single block tracks the whole data region: bit `i` of the
//! bitmap covers the block at LBA `sdata + i`, set meaning
//! allocated.  Allocation scans bytes first so that full bytes
//! (0xff) are skipped cheaply, then takes the lowest clear bit
//! of the first non-full byte; the allocator therefore always
//! returns the lowest free LBA.  The tail byte may describe
//! bits past the end of the data region; those never leave the
//! allocator.

use crate::block::{BlockIo, read_from};
use crate::fs::FileSystem;
use crate::result::{Error, Result};
use bit_field::BitField;
use core::fmt;

impl<D: BlockIo, C: fmt::Write> FileSystem<D, C> {
    /// Allocates one data block, marking it in the bitmap, and
    /// returns its absolute LBA.  Fails with `NoSpace` when the
    /// data region is exhausted.
    pub(crate) fn balloc(&mut self) -> Result<u32> {
        let mut b = read_from(&mut self.dev, self.sb.sbitmap);
        let nbytes = self.sb.nblock_dat.div_ceil(8) as usize;
        for i in 0..nbytes {
            let byte = b.as_bytes()[i];
            if byte == 0xff {
                continue;
            }
            let Some(off) = (0..8).find(|&o| !byte.get_bit(o)) else {
                return Err(Error::Corrupt);
            };
            let bit = i as u32 * 8 + off as u32;
            if bit >= self.sb.nblock_dat {
                // Only the tail byte reaches here: its clear
                // bits all lie past the data region.
                return Err(Error::NoSpace);
            }
            b.as_bytes_mut()[i].set_bit(off, true);
            self.dev.write_block(self.sb.sbitmap, &b);
            return Ok(self.sb.sdata + bit);
        }
        Err(Error::NoSpace)
    }

    /// Returns a data block to the bitmap.  Freeing a block
    /// outside the data region, or one that is already free,
    /// means the block tree or the bitmap is damaged.
    pub(crate) fn bfree(&mut self, lba: u32) -> Result<()> {
        if !self.sb.data_range().contains(&lba) {
            return Err(Error::Corrupt);
        }
        let bit = (lba - self.sb.sdata) as usize;
        let mut b = read_from(&mut self.dev, self.sb.sbitmap);
        let byte = &mut b.as_bytes_mut()[bit / 8];
        if !byte.get_bit(bit % 8) {
            return Err(Error::Corrupt);
        }
        byte.set_bit(bit % 8, false);
        self.dev.write_block(self.sb.sbitmap, &b);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::mkfs;

    #[test]
    fn first_allocation_is_the_first_data_block() {
        let mut fs = mkfs(200);
        let sdata = fs.superblock().sdata;
        assert_eq!(fs.balloc().unwrap(), sdata);
        assert_eq!(fs.balloc().unwrap(), sdata + 1);
    }

    #[test]
    fn freed_blocks_are_reused_lowest_first() {
        let mut fs = mkfs(200);
        let a = fs.balloc().unwrap();
        let b = fs.balloc().unwrap();
        let c = fs.balloc().unwrap();
        fs.bfree(a).unwrap();
        fs.bfree(c).unwrap();
        assert_eq!(fs.balloc().unwrap(), a);
        assert_eq!(fs.balloc().unwrap(), c);
        assert_eq!(fs.balloc().unwrap(), b + 2);
    }

    #[test]
    fn exhaustion_yields_nospace() {
        let mut fs = mkfs(200);
        let ndat = fs.superblock().nblock_dat;
        for i in 0..ndat {
            assert_eq!(fs.balloc().unwrap(), fs.superblock().sdata + i);
        }
        assert_eq!(fs.balloc(), Err(Error::NoSpace));
        let last = fs.superblock().sdata + ndat - 1;
        fs.bfree(last).unwrap();
        assert_eq!(fs.balloc().unwrap(), last);
    }

    #[test]
    fn free_outside_the_data_region_is_corruption() {
        let mut fs = mkfs(200);
        let sb = *fs.superblock();
        assert_eq!(fs.bfree(sb.sdata - 1), Err(Error::Corrupt));
        assert_eq!(fs.bfree(sb.sdata + sb.nblock_dat), Err(Error::Corrupt));
    }

    #[test]
    fn double_free_is_corruption() {
        let mut fs = mkfs(200);
        let lba = fs.balloc().unwrap();
        fs.bfree(lba).unwrap();
        assert_eq!(fs.bfree(lba), Err(Error::Corrupt));
    }
}
