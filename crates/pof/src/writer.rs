// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed slot writer.

use bytes::Bytes;

use crate::error::{PofError, PofResult};
use crate::portable::Portable;
use crate::ser::primitives;
use crate::slot::SlotDestination;
use crate::types::{PofContext, TypeShape};
use crate::value::PofValue;
use crate::wrappers::{PortableArray, PortableMap};

/// Generate one writer method per fixed-width primitive.
macro_rules! impl_write_primitive {
    ($($name:ident, $type:ty, $variant:ident);* $(;)?) => {
        $(
            pub fn $name(&mut self, slot: usize, value: $type) -> PofResult<()> {
                self.write_primitive(slot, &PofValue::$variant(value))
            }
        )*
    };
}

/// Writes the fields of one object into the slots of its frame.
///
/// Each slot may be written once. Slots must end up dense from zero.
pub struct PofWriter<'a> {
    context: &'a PofContext,
    destination: &'a mut SlotDestination,
}

impl<'a> PofWriter<'a> {
    #[must_use]
    pub fn new(context: &'a PofContext, destination: &'a mut SlotDestination) -> Self {
        Self {
            context,
            destination,
        }
    }

    #[must_use]
    pub fn context(&self) -> &'a PofContext {
        self.context
    }

    // ===================================================================
    // Primitives
    // ===================================================================

    impl_write_primitive! {
        write_s8, i8, S8;
        write_u8, u8, U8;
        write_s16, i16, S16;
        write_u16, u16, U16;
        write_s32, i32, S32;
        write_u32, u32, U32;
        write_s64, i64, S64;
        write_u64, u64, U64;
        write_float, f32, Float;
        write_double, f64, Double;
        write_char, char, Char;
        write_boolean, bool, Bool;
        write_guid, uuid::Uuid, Guid;
        write_date_time, chrono::DateTime<chrono::Utc>, DateTime;
        write_time_span, chrono::TimeDelta, TimeSpan;
    }

    fn write_primitive(&mut self, slot: usize, value: &PofValue) -> PofResult<()> {
        let mut buffer = Vec::with_capacity(16);
        primitives::encode(value, &mut buffer)?;
        self.destination.set_slot(slot, buffer)
    }

    pub fn write_string(&mut self, slot: usize, value: &str) -> PofResult<()> {
        let mut buffer = Vec::with_capacity(value.len() + 1);
        primitives::encode_string(value, &mut buffer)?;
        self.destination.set_slot(slot, buffer)
    }

    // ===================================================================
    // Raw bytes
    // ===================================================================

    /// Store `data` as the slot content, without a length prefix.
    pub fn write_bytes(&mut self, slot: usize, data: &[u8]) -> PofResult<()> {
        self.destination.set_slot(slot, Bytes::copy_from_slice(data))
    }

    pub fn write_bytes_range(
        &mut self,
        slot: usize,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> PofResult<()> {
        self.destination.set_slot_range(slot, data, offset, length)
    }

    /// Hand over an already encoded slot without copying.
    pub fn assign_slot(&mut self, slot: usize, data: impl Into<Bytes>) -> PofResult<()> {
        self.destination.set_slot(slot, data)
    }

    // ===================================================================
    // Descriptions and objects
    // ===================================================================

    /// Write a type description. Every id in it must be known and carry
    /// as many arguments as its arity.
    pub fn write_type(&mut self, slot: usize, shape: &TypeShape) -> PofResult<()> {
        check_description(self.context, shape)?;
        let mut buffer = Vec::new();
        shape.write_to(&mut buffer)?;
        self.destination.set_slot(slot, buffer)
    }

    /// Write `value` preceded by its runtime type description.
    pub fn write_object(&mut self, slot: usize, value: &dyn Portable) -> PofResult<()> {
        let mut buffer = Vec::new();
        encode_value(self.context, &mut buffer, value, true)?;
        self.destination.set_slot(slot, buffer)
    }

    /// Write `value` without a type description; the reader must know it.
    pub fn write_object_typeless(&mut self, slot: usize, value: &dyn Portable) -> PofResult<()> {
        let mut buffer = Vec::new();
        encode_value(self.context, &mut buffer, value, false)?;
        self.destination.set_slot(slot, buffer)
    }

    // ===================================================================
    // Collections
    // ===================================================================

    /// Write `items` as a `PortableArray<T>`.
    ///
    /// `polymorphic = false` is a request: it is overridden when an element
    /// is null or not exactly of type `T`.
    pub fn write_collection<T: Portable>(
        &mut self,
        slot: usize,
        items: &[T],
        polymorphic: bool,
    ) -> PofResult<()> {
        let array = PortableArray::from_slice(self.context, items, Some(polymorphic))?;
        let mut buffer = Vec::new();
        array.shape().write_to(&mut buffer)?;
        array.encode(self.context, &mut buffer)?;
        self.destination.set_slot(slot, buffer)
    }

    /// Write `map` as a `PortableMap<K, V>`, or null when `None`.
    pub fn write_map<'m, K, V, I>(
        &mut self,
        slot: usize,
        map: Option<I>,
        keys_polymorphic: bool,
        values_polymorphic: bool,
    ) -> PofResult<()>
    where
        K: Portable + 'm,
        V: Portable + 'm,
        I: IntoIterator<Item = (&'m K, &'m V)>,
    {
        let mut buffer = Vec::new();
        match map {
            None => TypeShape::null().write_to(&mut buffer)?,
            Some(entries) => {
                let map = PortableMap::from_entries(
                    self.context,
                    entries,
                    Some(keys_polymorphic),
                    Some(values_polymorphic),
                )?;
                map.shape().write_to(&mut buffer)?;
                map.encode(self.context, &mut buffer)?;
            }
        }
        self.destination.set_slot(slot, buffer)
    }
}

fn check_description(context: &PofContext, shape: &TypeShape) -> PofResult<()> {
    let id = shape.head();
    let arity = context.arity_of(id).ok_or(PofError::TypeIdNotFound(id))?;
    let args: Vec<&TypeShape> = match shape {
        TypeShape::Leaf(_) => Vec::new(),
        TypeShape::Generic { args, .. } => args.iter().collect(),
        TypeShape::Array(element) => vec![element.as_ref()],
    };
    if args.len() != arity {
        return Err(PofError::InvalidData(format!(
            "pof id {id} takes {arity} type arguments, description has {}",
            args.len()
        )));
    }
    args.into_iter()
        .try_for_each(|arg| check_description(context, arg))
}

/// Encode `value`, optionally preceded by its description.
///
/// Null writes the null id when typed and nothing when typeless.
pub(crate) fn encode_value(
    context: &PofContext,
    sink: &mut Vec<u8>,
    value: &dyn Portable,
    write_type: bool,
) -> PofResult<()> {
    match value.runtime_shape(context)? {
        None => {
            if write_type {
                TypeShape::null().write_to(sink)?;
            }
            Ok(())
        }
        Some(shape) => {
            if write_type {
                shape.write_to(sink)?;
            }
            value.encode_payload(context, sink)
        }
    }
}
