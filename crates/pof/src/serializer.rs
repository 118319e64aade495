// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream entry points.
//!
//! A serialized value is an envelope:
//!
//! ```text
//! [int32 length][slot frame]
//! ```
//!
//! where slot 0 of the frame holds the root object, preceded by its type
//! description unless [`SerializationFlags::TYPELESS`] is set. With
//! [`SerializationFlags::LENGTHLESS`] the length prefix is omitted and the
//! frame extends to the end of the input.

use std::io::{Read, Write};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;

use crate::error::{PofError, PofResult};
use crate::portable::Portable;
use crate::reader::PofReader;
use crate::ser::cursor::ByteCursor;
use crate::slot::{SlotDestination, SlotSource};
use crate::types::{PofContext, TypeShape};
use crate::value::PofValue;
use crate::writer::PofWriter;

bitflags! {
    /// Envelope options. Both sides must agree on them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SerializationFlags: u32 {
        /// Omit the root type description.
        const TYPELESS = 1;
        /// Omit the length prefix.
        const LENGTHLESS = 2;
    }
}

/// Serializes values against a shared [`PofContext`].
#[derive(Debug, Clone, Copy)]
pub struct PofSerializer<'a> {
    context: &'a PofContext,
}

impl<'a> PofSerializer<'a> {
    #[must_use]
    pub fn new(context: &'a PofContext) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &'a PofContext {
        self.context
    }

    pub fn serialize<W: Write>(&self, sink: &mut W, value: &dyn Portable) -> PofResult<()> {
        self.serialize_with(sink, value, SerializationFlags::empty())
    }

    pub fn serialize_with<W: Write>(
        &self,
        sink: &mut W,
        value: &dyn Portable,
        flags: SerializationFlags,
    ) -> PofResult<()> {
        let mut buffer = Vec::new();
        write_envelope(self.context, &mut buffer, value, flags)?;
        log::debug!(
            "[pof::serializer] wrote {} bytes (flags {:?})",
            buffer.len(),
            flags
        );
        sink.write_all(&buffer)?;
        Ok(())
    }

    pub fn to_bytes(&self, value: &dyn Portable) -> PofResult<Vec<u8>> {
        let mut buffer = Vec::new();
        write_envelope(self.context, &mut buffer, value, SerializationFlags::empty())?;
        Ok(buffer)
    }

    pub fn deserialize<T: Portable, R: Read>(&self, source: &mut R) -> PofResult<T> {
        self.deserialize_with(source, SerializationFlags::empty())
    }

    /// Decode one envelope as `T`. A typeless envelope is decoded against
    /// the declared description of `T`.
    pub fn deserialize_with<T: Portable, R: Read>(
        &self,
        source: &mut R,
        flags: SerializationFlags,
    ) -> PofResult<T> {
        let shape = if flags.contains(SerializationFlags::TYPELESS) {
            Some(T::declared_shape(self.context)?)
        } else {
            None
        };
        T::from_value(self.read_value(source, flags, shape.as_ref())?)
    }

    /// Decode one typed envelope without a target type.
    pub fn deserialize_value<R: Read>(&self, source: &mut R) -> PofResult<PofValue> {
        self.read_value(source, SerializationFlags::empty(), None)
    }

    pub fn from_bytes<T: Portable>(&self, data: &[u8]) -> PofResult<T> {
        let mut source = data;
        self.deserialize(&mut source)
    }

    fn read_value<R: Read>(
        &self,
        source: &mut R,
        flags: SerializationFlags,
        shape: Option<&TypeShape>,
    ) -> PofResult<PofValue> {
        let limit = self.context.config().max_frame_len;
        let body = if flags.contains(SerializationFlags::LENGTHLESS) {
            read_limited(source, limit)?
        } else {
            let raw = source.read_i32::<LittleEndian>()?;
            let len = usize::try_from(raw).map_err(|_| PofError::ReadFailed {
                offset: 0,
                reason: "negative length",
            })?;
            if len > limit {
                return Err(PofError::LimitExceeded {
                    what: "envelope length",
                    limit,
                });
            }
            let mut body = Vec::with_capacity(len.min(64 * 1024));
            source.take(len as u64).read_to_end(&mut body)?;
            if body.len() != len {
                return Err(PofError::ReadFailed {
                    offset: 4 + body.len(),
                    reason: "unexpected end of envelope",
                });
            }
            body
        };
        log::debug!("[pof::serializer] read envelope of {} bytes", body.len());
        decode_frame(self.context, Bytes::from(body), shape, 0)
    }
}

fn read_limited<R: Read>(source: &mut R, limit: usize) -> PofResult<Vec<u8>> {
    let mut body = Vec::new();
    source
        .take(limit as u64 + 1)
        .read_to_end(&mut body)?;
    if body.len() > limit {
        return Err(PofError::LimitExceeded {
            what: "envelope length",
            limit,
        });
    }
    Ok(body)
}

fn envelope_len(len: usize) -> PofResult<i32> {
    i32::try_from(len).map_err(|_| PofError::LimitExceeded {
        what: "envelope length",
        limit: i32::MAX as usize,
    })
}

/// Write `value` as one envelope.
pub(crate) fn write_envelope(
    context: &PofContext,
    sink: &mut Vec<u8>,
    value: &dyn Portable,
    flags: SerializationFlags,
) -> PofResult<()> {
    let mut destination = SlotDestination::new();
    let mut writer = PofWriter::new(context, &mut destination);
    if flags.contains(SerializationFlags::TYPELESS) {
        writer.write_object_typeless(0, value)?;
    } else {
        writer.write_object(0, value)?;
    }
    if !flags.contains(SerializationFlags::LENGTHLESS) {
        sink.write_i32::<LittleEndian>(envelope_len(destination.encoded_len())?)?;
    }
    destination.write_to(sink)
}

/// Read one envelope at the cursor position.
pub(crate) fn read_envelope(
    context: &PofContext,
    cursor: &mut ByteCursor,
    flags: SerializationFlags,
    shape: Option<&TypeShape>,
    depth: usize,
) -> PofResult<PofValue> {
    let body = if flags.contains(SerializationFlags::LENGTHLESS) {
        cursor.read_rest()
    } else {
        let len = cursor.read_len("envelope length", context.config().max_frame_len)?;
        cursor.read_bytes(len)?
    };
    decode_frame(context, body, shape, depth)
}

fn decode_frame(
    context: &PofContext,
    body: Bytes,
    shape: Option<&TypeShape>,
    depth: usize,
) -> PofResult<PofValue> {
    let mut cursor = ByteCursor::new(body);
    let slots = SlotSource::read_from(&mut cursor, context.config())?;
    if !cursor.is_eof() {
        return Err(PofError::InvalidData(format!(
            "{} trailing bytes after envelope frame",
            cursor.remaining()
        )));
    }
    PofReader::nested(context, slots, depth)?.read_slot_value(0, shape)
}
