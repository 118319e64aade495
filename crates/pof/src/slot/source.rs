// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use bytes::Bytes;

use crate::config::PofConfig;
use crate::error::{PofError, PofResult};
use crate::ser::cursor::ByteCursor;

/// Decoded slot frame. Slots are views into the buffer they were read from.
#[derive(Debug, Clone, Default)]
pub struct SlotSource {
    slots: Vec<Bytes>,
}

impl SlotSource {
    /// Frame whose only slot holds `data`.
    #[must_use]
    pub fn single(data: Bytes) -> Self {
        Self { slots: vec![data] }
    }

    #[must_use]
    pub fn from_slots(slots: Vec<Bytes>) -> Self {
        Self { slots }
    }

    /// Parse a frame at the cursor position, consuming exactly its bytes.
    pub fn read_from(cursor: &mut ByteCursor, config: &PofConfig) -> PofResult<Self> {
        let count = cursor.read_len("slot count", config.max_slot_count)?;
        // Every length takes four bytes: reject counts the input cannot hold.
        if count.saturating_mul(4) > cursor.remaining() {
            return Err(PofError::ReadFailed {
                offset: cursor.offset(),
                reason: "slot table exceeds buffer",
            });
        }
        let lengths = (0..count)
            .map(|_| cursor.read_len("slot length", config.max_frame_len))
            .collect::<PofResult<Vec<_>>>()?;
        let slots = lengths
            .into_iter()
            .map(|len| cursor.read_bytes(len))
            .collect::<PofResult<Vec<_>>>()?;
        Ok(Self { slots })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> PofResult<&Bytes> {
        self.slots.get(slot).ok_or(PofError::SlotOutOfRange {
            slot,
            count: self.slots.len(),
        })
    }
}
