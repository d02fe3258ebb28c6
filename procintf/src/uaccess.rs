//! Byte transport across the caller boundary.
//!
//! A caller hands an endpoint a buffer together with the byte count it
//! claims the buffer holds, the same shape as a `(ubuf, count)` pair of a
//! `write(2)`. The claimed count is always known up front; the copy itself
//! is what can fail, when the buffer is shorter than claimed.

use procintf_common::error::{IntfError, IntfResult};

/// Caller-owned source buffer for writes.
#[derive(Debug, Clone, Copy)]
pub struct UserSlice<'a> {
    mem: &'a [u8],
    count: usize,
}

impl<'a> UserSlice<'a> {
    /// Buffer whose claimed count equals its length.
    pub fn new(mem: &'a [u8]) -> Self {
        Self {
            mem,
            count: mem.len(),
        }
    }

    /// Buffer claiming `count` bytes regardless of how many it holds.
    pub fn with_count(mem: &'a [u8], count: usize) -> Self {
        Self { mem, count }
    }

    /// Bytes the caller claims to pass.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if the caller passes no bytes.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy the first `dst.len()` claimed bytes into `dst`.
    pub fn copy_from_user(&self, dst: &mut [u8]) -> IntfResult<()> {
        let len = dst.len();
        if len > self.count || len > self.mem.len() {
            return Err(IntfError::TransportFault { len });
        }
        dst.copy_from_slice(&self.mem[..len]);
        Ok(())
    }
}

/// Caller-owned destination buffer for reads.
#[derive(Debug)]
pub struct UserSliceMut<'a> {
    mem: &'a mut [u8],
    count: usize,
}

impl<'a> UserSliceMut<'a> {
    /// Buffer whose claimed count equals its length.
    pub fn new(mem: &'a mut [u8]) -> Self {
        let count = mem.len();
        Self { mem, count }
    }

    /// Buffer claiming room for `count` bytes regardless of its length.
    pub fn with_count(mem: &'a mut [u8], count: usize) -> Self {
        Self { mem, count }
    }

    /// Room the caller claims to offer.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if the caller offers no room.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy `src` to the start of the buffer.
    pub fn copy_to_user(&mut self, src: &[u8]) -> IntfResult<()> {
        let len = src.len();
        if len > self.count || len > self.mem.len() {
            return Err(IntfError::TransportFault { len });
        }
        self.mem[..len].copy_from_slice(src);
        Ok(())
    }
}
