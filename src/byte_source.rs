//! Pull-based reader over an in-memory compressed buffer.
//!
//! The cursor is allowed to move past the end of the buffer through `skip`
//! and `seek`; only `read` is bounded, and it reports end-of-stream as `None`
//! rather than as a zero-length read.

use crate::error::SourceError;

#[derive(Debug, Clone)]
pub struct MemoryByteSource<'a> {
    data: &'a [u8],
    offset: u64,
}

impl<'a> MemoryByteSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> u64 {
        (self.data.len() as u64).saturating_sub(self.offset)
    }

    /// Copies up to `buf.len()` bytes at the cursor into `buf`.
    ///
    /// Returns `None` once the cursor is at or past the end of the buffer;
    /// callers seeing `None` must not retry.
    pub fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        if self.offset >= self.data.len() as u64 {
            return None;
        }
        let start = self.offset as usize;
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        self.offset += count as u64;
        Some(count)
    }

    /// Advances the cursor by `n` bytes without reading and returns the new cursor.
    pub fn skip(&mut self, n: i64) -> Result<u64, SourceError> {
        if n < 0 {
            return Err(SourceError::NegativeSkip(n));
        }
        self.offset = self.offset.saturating_add(n as u64);
        Ok(self.offset)
    }

    /// Moves the cursor to an absolute offset. No upper bound is enforced.
    pub fn seek(&mut self, offset: i64) -> Result<(), SourceError> {
        if offset < 0 {
            return Err(SourceError::NegativeSeek(offset));
        }
        self.offset = offset as u64;
        Ok(())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Some(0) | None => return Err(SourceError::UnexpectedEof(self.offset)),
                Some(count) => filled += count,
            }
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, SourceError> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SourceError> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    pub fn read_u32(&mut self) -> Result<u32, SourceError> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    pub fn read_u64(&mut self) -> Result<u64, SourceError> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_be_bytes(b))
    }

    /// Borrows `len` bytes starting at absolute offset `start` without moving the cursor.
    pub fn slice(&self, start: u64, len: u64) -> Result<&'a [u8], SourceError> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.data.len() as u64)
            .ok_or(SourceError::UnexpectedEof(start))?;
        Ok(&self.data[start as usize..end as usize])
    }
}
