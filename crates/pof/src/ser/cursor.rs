// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked little-endian read cursor over an immutable buffer.
//!
//! Sub-ranges are handed out as [`Bytes`] views of the same allocation, so
//! nested frames never copy their parent's buffer.

use bytes::Bytes;

use crate::error::{PofError, PofResult};

/// Generate read methods for fixed-width primitives.
///
/// Each generated method checks the remaining length, decodes the value
/// with `from_le_bytes()` and advances the offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> PofResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.take($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Read cursor (bounds-checked, zero-copy)
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buffer: Bytes,
    offset: usize,
}

impl ByteCursor {
    #[must_use]
    pub fn new(buffer: Bytes) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i64_le, i64, 8);
    impl_read_le!(read_f32_le, f32, 4);
    impl_read_le!(read_f64_le, f64, 8);

    /// Read an `int32` length and check it against `limit`.
    pub fn read_len(&mut self, what: &'static str, limit: usize) -> PofResult<usize> {
        let offset = self.offset;
        let raw = self.read_i32_le()?;
        let len = usize::try_from(raw).map_err(|_| PofError::ReadFailed {
            offset,
            reason: "negative length",
        })?;
        if len > limit {
            return Err(PofError::LimitExceeded { what, limit });
        }
        Ok(len)
    }

    /// Borrow the next `len` bytes as a shared view.
    pub fn read_bytes(&mut self, len: usize) -> PofResult<Bytes> {
        let start = self.offset;
        self.take(len)?;
        Ok(self.buffer.slice(start..start + len))
    }

    /// Bytes up to (excluding) the next zero byte; the terminator is consumed.
    pub fn read_until_nul(&mut self) -> PofResult<Bytes> {
        let rest = &self.buffer[self.offset..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => {
                let start = self.offset;
                self.offset += end + 1;
                Ok(self.buffer.slice(start..start + end))
            }
            None => Err(PofError::ReadFailed {
                offset: self.buffer.len(),
                reason: "missing string terminator",
            }),
        }
    }

    /// Everything not consumed yet.
    pub fn read_rest(&mut self) -> Bytes {
        let rest = self.buffer.slice(self.offset..);
        self.offset = self.buffer.len();
        rest
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn take(&mut self, len: usize) -> PofResult<&[u8]> {
        if len > self.remaining() {
            return Err(PofError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer",
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.buffer[start..start + len])
    }
}
