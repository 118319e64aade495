// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed slot reader.

use std::collections::HashMap;
use std::hash::Hash;

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{PofError, PofResult};
use crate::portable::Portable;
use crate::ser::cursor::ByteCursor;
use crate::ser::primitives;
use crate::slot::SlotSource;
use crate::types::{PofContext, ReservedTypeId, TypeShape};
use crate::value::PofValue;
use crate::wrappers::{PortableArray, PortableMap};

/// Generate one reader method per fixed-width primitive.
macro_rules! impl_read_primitive {
    ($($name:ident, $type:ty, $read:ident);* $(;)?) => {
        $(
            pub fn $name(&self, slot: usize) -> PofResult<$type> {
                self.cursor(slot)?.$read()
            }
        )*
    };
}

/// Reads the fields of one object out of the slots of its frame.
///
/// Reads never consume: a slot can be read any number of times.
pub struct PofReader<'a> {
    context: &'a PofContext,
    slots: SlotSource,
    depth: usize,
}

impl<'a> PofReader<'a> {
    #[must_use]
    pub fn new(context: &'a PofContext, slots: SlotSource) -> Self {
        Self {
            context,
            slots,
            depth: 0,
        }
    }

    /// Reader for a frame nested `depth` levels below the root.
    pub(crate) fn nested(
        context: &'a PofContext,
        slots: SlotSource,
        depth: usize,
    ) -> PofResult<Self> {
        let limit = context.config().max_depth;
        if depth > limit {
            return Err(PofError::LimitExceeded {
                what: "nesting depth",
                limit,
            });
        }
        Ok(Self {
            context,
            slots,
            depth,
        })
    }

    #[must_use]
    pub fn context(&self) -> &'a PofContext {
        self.context
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    fn cursor(&self, slot: usize) -> PofResult<ByteCursor> {
        Ok(ByteCursor::new(self.slots.get(slot)?.clone()))
    }

    // ===================================================================
    // Primitives
    // ===================================================================

    impl_read_primitive! {
        read_s8, i8, read_i8;
        read_u8, u8, read_u8;
        read_s16, i16, read_i16_le;
        read_u16, u16, read_u16_le;
        read_s32, i32, read_i32_le;
        read_u32, u32, read_u32_le;
        read_s64, i64, read_i64_le;
        read_u64, u64, read_u64_le;
        read_float, f32, read_f32_le;
        read_double, f64, read_f64_le;
    }

    pub fn read_char(&self, slot: usize) -> PofResult<char> {
        primitives::char_from_unit(self.cursor(slot)?.read_u16_le()?)
    }

    pub fn read_boolean(&self, slot: usize) -> PofResult<bool> {
        Ok(self.cursor(slot)?.read_u8()? != 0)
    }

    pub fn read_string(&self, slot: usize) -> PofResult<String> {
        primitives::decode_string(&mut self.cursor(slot)?)
    }

    pub fn read_guid(&self, slot: usize) -> PofResult<Uuid> {
        primitives::decode_guid(&mut self.cursor(slot)?)
    }

    pub fn read_date_time(&self, slot: usize) -> PofResult<DateTime<Utc>> {
        primitives::datetime_from_binary(self.cursor(slot)?.read_i64_le()?)
    }

    pub fn read_time_span(&self, slot: usize) -> PofResult<TimeDelta> {
        primitives::timespan_from_ticks(self.cursor(slot)?.read_i64_le()?)
    }

    /// Raw slot content, shared with the input buffer.
    pub fn read_bytes(&self, slot: usize) -> PofResult<Bytes> {
        self.slots.get(slot).cloned()
    }

    pub fn read_type(&self, slot: usize) -> PofResult<TypeShape> {
        TypeShape::parse(&mut self.cursor(slot)?, self.context)
    }

    // ===================================================================
    // Objects and collections
    // ===================================================================

    /// Decode the typed object in `slot` without a target type.
    pub fn read_value(&self, slot: usize) -> PofResult<PofValue> {
        self.read_slot_value(slot, None)
    }

    pub fn read_object<T: Portable>(&self, slot: usize) -> PofResult<T> {
        T::from_value(self.read_value(slot)?)
    }

    /// Decode an object written without description as `T`.
    pub fn read_object_typeless<T: Portable>(&self, slot: usize) -> PofResult<T> {
        let shape = T::declared_shape(self.context)?;
        T::from_value(self.read_slot_value(slot, Some(&shape))?)
    }

    /// Array or collection, `None` when null.
    pub fn read_array<T: Portable>(&self, slot: usize) -> PofResult<Option<Vec<T>>> {
        Option::<Vec<T>>::from_value(self.read_value(slot)?)
    }

    pub fn read_collection<T, C>(&self, slot: usize) -> PofResult<Option<C>>
    where
        T: Portable,
        C: FromIterator<T>,
    {
        Ok(self
            .read_array::<T>(slot)?
            .map(|items| items.into_iter().collect()))
    }

    /// Append the collection in `slot` to `target`. Returns `false` when
    /// the slot holds null.
    pub fn read_collection_into<T, C>(&self, slot: usize, target: &mut C) -> PofResult<bool>
    where
        T: Portable,
        C: Extend<T>,
    {
        match self.read_array::<T>(slot)? {
            Some(items) => {
                target.extend(items);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Map, `None` when null.
    pub fn read_map<K, V>(&self, slot: usize) -> PofResult<Option<HashMap<K, V>>>
    where
        K: Portable + Eq + Hash,
        V: Portable,
    {
        Option::<HashMap<K, V>>::from_value(self.read_value(slot)?)
    }

    // ===================================================================
    // Decoding by description
    // ===================================================================

    /// Decode `slot`, reading the description first unless `shape` is
    /// given.
    pub(crate) fn read_slot_value(
        &self,
        slot: usize,
        shape: Option<&TypeShape>,
    ) -> PofResult<PofValue> {
        let mut cursor = self.cursor(slot)?;
        let value = match shape {
            // Every encoding but typeless null takes at least one byte.
            Some(_) if cursor.is_eof() => PofValue::Null,
            Some(shape) => self.decode(&mut cursor, shape)?,
            None => {
                let shape = TypeShape::parse(&mut cursor, self.context)?;
                self.decode(&mut cursor, &shape)?
            }
        };
        if !cursor.is_eof() {
            return Err(PofError::InvalidData(format!(
                "{} trailing bytes after the value in slot {slot}",
                cursor.remaining()
            )));
        }
        Ok(value)
    }

    fn decode(&self, cursor: &mut ByteCursor, shape: &TypeShape) -> PofResult<PofValue> {
        if let Some(element) = shape.element() {
            let nested = self.open_nested(cursor)?;
            return PortableArray::deserialize(&nested, element)
                .map(|array| PofValue::Array(array.into_inner()));
        }
        if let Some((key, value)) = shape.entry() {
            let nested = self.open_nested(cursor)?;
            return PortableMap::deserialize(&nested, key, value)
                .map(|map| PofValue::Map(map.into_inner()));
        }
        match shape.reserved_head() {
            Some(ReservedTypeId::Null) => Ok(PofValue::Null),
            Some(ReservedTypeId::Enumerable) => {
                let nested = self.open_nested(cursor)?;
                PortableArray::deserialize(&nested, &TypeShape::object())
                    .map(|array| PofValue::Array(array.into_inner()))
            }
            Some(ReservedTypeId::Object) => Err(PofError::Unsupported(
                "object payload without a concrete type description".to_string(),
            )),
            Some(kind) if kind.is_primitive() => {
                primitives::decode(kind, cursor, self.context.config().max_frame_len)
            }
            Some(kind) => Err(PofError::mismatch(
                format!("{} with {} type arguments", kind.name(), kind.arity()),
                shape.to_string(),
            )),
            None => self.decode_user(cursor, shape),
        }
    }

    fn decode_user(&self, cursor: &mut ByteCursor, shape: &TypeShape) -> PofResult<PofValue> {
        let resolved = self.context.resolve(shape)?;
        let mut instance = resolved
            .create_instance()
            .ok_or_else(|| PofError::MissingConstructor {
                type_name: shape.to_string(),
            })?;
        let nested = self.open_nested(cursor)?;
        instance.deserialize(&nested)?;
        log::trace!(
            "[pof::reader] decoded {} from {} slots at depth {}",
            shape,
            nested.slot_count(),
            nested.depth
        );
        Ok(PofValue::Object(instance))
    }

    fn open_nested(&self, cursor: &mut ByteCursor) -> PofResult<PofReader<'a>> {
        let slots = SlotSource::read_from(cursor, self.context.config())?;
        Self::nested(self.context, slots, self.depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotDestination;
    use crate::writer::PofWriter;

    fn frame(context: &PofContext, fill: impl FnOnce(&mut PofWriter<'_>)) -> SlotSource {
        let mut destination = SlotDestination::new();
        fill(&mut PofWriter::new(context, &mut destination));
        let bytes = destination.to_bytes().expect("frame");
        SlotSource::read_from(&mut ByteCursor::new(Bytes::from(bytes)), context.config())
            .expect("parse frame")
    }

    #[test]
    fn test_reads_are_repeatable() {
        let context = PofContext::new();
        let slots = frame(&context, |w| {
            w.write_u64(0, u64::MAX).expect("u64");
        });
        let reader = PofReader::new(&context, slots);
        assert_eq!(reader.read_u64(0).expect("first"), u64::MAX);
        assert_eq!(reader.read_u64(0).expect("second"), u64::MAX);
    }

    #[test]
    fn test_short_slot_fails() {
        let context = PofContext::new();
        let slots = frame(&context, |w| {
            w.write_u8(0, 1).expect("u8");
        });
        let reader = PofReader::new(&context, slots);
        assert!(matches!(reader.read_s64(0), Err(PofError::ReadFailed { .. })));
        assert!(matches!(
            reader.read_u8(5),
            Err(PofError::SlotOutOfRange { slot: 5, count: 1 })
        ));
    }

    #[test]
    fn test_typeless_object_needs_concrete_target() {
        let context = PofContext::new();
        let slots = frame(&context, |w| {
            w.write_object_typeless(0, &PofValue::S32(1)).expect("typeless");
        });
        let reader = PofReader::new(&context, slots);
        assert!(matches!(
            reader.read_object_typeless::<PofValue>(0),
            Err(PofError::Unsupported(_))
        ));
        assert_eq!(reader.read_object_typeless::<i32>(0).expect("as s32"), 1);
    }

    #[test]
    fn test_null_collections() {
        let context = PofContext::new();
        let slots = frame(&context, |w| {
            w.write_object(0, &None::<Vec<i32>>).expect("null array");
            w.write_collection(1, &[3u16, 4], false).expect("array");
        });
        let reader = PofReader::new(&context, slots);
        assert_eq!(reader.read_array::<i32>(0).expect("null"), None);

        let mut target = vec![1u16];
        assert!(reader.read_collection_into::<u16, _>(1, &mut target).expect("extend"));
        assert_eq!(target, vec![1, 3, 4]);
        assert!(!reader.read_collection_into::<u16, _>(0, &mut target).expect("null"));
    }

    #[test]
    fn test_depth_limit() {
        let context = PofContext::with_config(crate::PofConfig::default().with_max_depth(2));
        let nested = vec![vec![vec![1i32]]];
        let slots = frame(&context, |w| {
            w.write_object(0, &nested).expect("nested arrays");
        });
        let reader = PofReader::new(&context, slots);
        assert!(matches!(
            reader.read_value(0),
            Err(PofError::LimitExceeded { what: "nesting depth", .. })
        ));
    }
}
