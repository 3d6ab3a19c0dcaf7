//! Stream writing helpers.
//!
//! Archive writers lay out tables before they know where later sections
//! land, then come back and patch the offsets. [`WriteExt`] adds the
//! position, alignment and backpatch primitives for that pattern on top of
//! any `Write + Seek` stream.

use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::Result;

/// Extension trait for seekable output streams.
pub trait WriteExt: Write + Seek {
    /// Current absolute position in the stream.
    fn position(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    /// Pad with zero bytes until the position is a multiple of `alignment`.
    ///
    /// Returns the aligned position.
    fn align(&mut self, alignment: u64) -> Result<u64> {
        let position = self.stream_position()?;
        let remainder = position % alignment;
        if remainder != 0 {
            let padding = (alignment - remainder) as usize;
            self.write_all(&vec![0u8; padding])?;
        }
        Ok(self.stream_position()?)
    }

    /// Write a little-endian u64 at `offset`, then return to the current position.
    fn patch_u64(&mut self, offset: u64, value: u64) -> Result<()> {
        let resume = self.stream_position()?;
        self.seek(SeekFrom::Start(offset))?;
        self.write_u64::<LittleEndian>(value)?;
        self.seek(SeekFrom::Start(resume))?;
        Ok(())
    }

    /// Write the current position as a u64 at `offset`.
    ///
    /// Used to point a placeholder at the section about to be written.
    fn patch_offset_here(&mut self, offset: u64) -> Result<u64> {
        let here = self.stream_position()?;
        self.patch_u64(offset, here)?;
        Ok(here)
    }
}

impl<W: Write + Seek + ?Sized> WriteExt for W {}
