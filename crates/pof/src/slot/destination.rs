// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::BTreeMap;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;

use crate::error::{PofError, PofResult};

/// Write-once slot storage for one frame under construction.
#[derive(Debug, Default, Clone)]
pub struct SlotDestination {
    slots: BTreeMap<usize, Bytes>,
}

impl SlotDestination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` in `slot`. Each slot can be written once.
    pub fn set_slot(&mut self, slot: usize, data: impl Into<Bytes>) -> PofResult<()> {
        if self.slots.contains_key(&slot) {
            return Err(PofError::SlotAlreadySet(slot));
        }
        self.slots.insert(slot, data.into());
        Ok(())
    }

    /// Store `data[offset..offset + length]` in `slot`.
    pub fn set_slot_range(
        &mut self,
        slot: usize,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> PofResult<()> {
        let range = offset
            .checked_add(length)
            .filter(|end| *end <= data.len())
            .map(|end| offset..end)
            .ok_or_else(|| {
                PofError::InvalidData(format!(
                    "range {offset}+{length} exceeds buffer of {} bytes",
                    data.len()
                ))
            })?;
        self.set_slot(slot, Bytes::copy_from_slice(&data[range]))
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Bytes> {
        self.slots.get(&slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Size of the encoded frame in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        4 + 4 * self.slots.len() + self.slots.values().map(Bytes::len).sum::<usize>()
    }

    /// Emit the frame. Slots must be dense from zero.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> PofResult<()> {
        let count = self.slots.len();
        if let Some(missing) = (0..count).find(|i| !self.slots.contains_key(i)) {
            return Err(PofError::SlotGap { missing, count });
        }
        sink.write_i32::<LittleEndian>(wire_len(count)?)?;
        for data in self.slots.values() {
            sink.write_i32::<LittleEndian>(wire_len(data.len())?)?;
        }
        for data in self.slots.values() {
            sink.write_all(data)?;
        }
        Ok(())
    }

    /// Encoded frame as a buffer.
    pub fn to_bytes(&self) -> PofResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out)?;
        Ok(out)
    }
}

fn wire_len(len: usize) -> PofResult<i32> {
    i32::try_from(len).map_err(|_| PofError::LimitExceeded {
        what: "frame length",
        limit: i32::MAX as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let mut dest = SlotDestination::new();
        dest.set_slot(1, vec![0xBB, 0xCC]).expect("set slot 1");
        dest.set_slot(0, vec![0xAA]).expect("set slot 0");

        let bytes = dest.to_bytes().expect("write frame");
        assert_eq!(
            bytes,
            vec![2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0xAA, 0xBB, 0xCC]
        );
        assert_eq!(bytes.len(), dest.encoded_len());
    }

    #[test]
    fn test_empty_frame() {
        let dest = SlotDestination::new();
        assert_eq!(dest.to_bytes().expect("write frame"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_rewrite_rejected() {
        let mut dest = SlotDestination::new();
        dest.set_slot(3, Bytes::from_static(b"x")).expect("first write");
        match dest.set_slot(3, Bytes::from_static(b"y")) {
            Err(PofError::SlotAlreadySet(3)) => {}
            other => std::panic::panic_any(format!("{other:?}")),
        }
        assert_eq!(dest.get(3).map(|b| &b[..]), Some(&b"x"[..]));
    }

    #[test]
    fn test_gap_rejected() {
        let mut dest = SlotDestination::new();
        dest.set_slot(0, vec![1]).expect("set slot 0");
        dest.set_slot(2, vec![2]).expect("set slot 2");
        match dest.to_bytes() {
            Err(PofError::SlotGap { missing: 1, count: 2 }) => {}
            other => std::panic::panic_any(format!("{other:?}")),
        }
    }

    #[test]
    fn test_slot_range() {
        let mut dest = SlotDestination::new();
        dest.set_slot_range(0, b"abcdef", 2, 3).expect("range in bounds");
        assert_eq!(dest.get(0).map(|b| &b[..]), Some(&b"cde"[..]));
        assert!(dest.set_slot_range(1, b"abc", 2, 5).is_err());
        assert!(dest.set_slot_range(1, b"abc", usize::MAX, 2).is_err());
    }
}
