// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection wrappers: `PortableArray<T>` and `PortableMap<K, V>`.
//!
//! Both are written as nested slot frames:
//!
//! ```text
//! PortableArray  [0] bool polymorphic  [1] s32 count  [2] element blob
//! PortableMap    [0] bool keys poly    [1] bool values poly
//!                [2] s32 count         [3] entry blob (key, value, ...)
//! ```
//!
//! Each blob element is a serializer envelope. Monomorphic elements are
//! written typeless and decoded against the declared element description.

use bytes::Bytes;

use crate::error::{PofError, PofResult};
use crate::portable::Portable;
use crate::reader::PofReader;
use crate::ser::cursor::ByteCursor;
use crate::serializer::{read_envelope, write_envelope, SerializationFlags};
use crate::slot::SlotDestination;
use crate::types::{PofContext, TypeShape};
use crate::value::PofValue;
use crate::writer::PofWriter;

/// Statically declared element type of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared {
    shape: TypeShape,
    value_type: bool,
}

impl Declared {
    pub fn of<T: Portable>(context: &PofContext) -> PofResult<Self> {
        Ok(Self {
            shape: T::declared_shape(context)?,
            value_type: T::is_value_type(),
        })
    }

    /// Elements of any type.
    #[must_use]
    pub fn object() -> Self {
        Self {
            shape: TypeShape::object(),
            value_type: false,
        }
    }

    #[must_use]
    pub fn new(shape: TypeShape, value_type: bool) -> Self {
        Self { shape, value_type }
    }

    #[must_use]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }
}

/// Whether some element needs its own type description.
fn needs_type_tags<'e>(
    context: &PofContext,
    declared: &Declared,
    elements: impl IntoIterator<Item = &'e dyn Portable>,
) -> PofResult<bool> {
    if declared.value_type {
        return Ok(false);
    }
    for element in elements {
        match element.runtime_shape(context)? {
            None => return Ok(true),
            Some(shape) if !shape.denotes_same_type(&declared.shape) => return Ok(true),
            Some(_) => {}
        }
    }
    Ok(false)
}

fn choose_polymorphism(requested: Option<bool>, required: bool, declared: &Declared) -> bool {
    match requested {
        Some(true) => true,
        Some(false) if required => {
            log::debug!(
                "[pof::wrappers] monomorphic {} requested but elements differ, writing type tags",
                declared.shape
            );
            true
        }
        _ => required,
    }
}

fn element_flags(polymorphic: bool) -> SerializationFlags {
    if polymorphic {
        SerializationFlags::empty()
    } else {
        SerializationFlags::TYPELESS
    }
}

fn decode_count(reader: &PofReader<'_>, slot: usize) -> PofResult<usize> {
    let count = reader.read_s32(slot)?;
    let count = usize::try_from(count)
        .map_err(|_| PofError::InvalidData(format!("negative element count {count}")))?;
    let limit = reader.context().config().max_elements;
    if count > limit {
        return Err(PofError::LimitExceeded {
            what: "collection elements",
            limit,
        });
    }
    Ok(count)
}

fn encode_count(count: usize) -> PofResult<i32> {
    i32::try_from(count).map_err(|_| PofError::LimitExceeded {
        what: "collection elements",
        limit: i32::MAX as usize,
    })
}

fn decode_element(
    reader: &PofReader<'_>,
    cursor: &mut ByteCursor,
    polymorphic: bool,
    declared: &TypeShape,
) -> PofResult<PofValue> {
    let shape = (!polymorphic).then_some(declared);
    // Element envelopes share their collection's depth.
    read_envelope(
        reader.context(),
        cursor,
        element_flags(polymorphic),
        shape,
        reader.depth(),
    )
}

fn expect_consumed(cursor: &ByteCursor) -> PofResult<()> {
    if cursor.is_eof() {
        Ok(())
    } else {
        Err(PofError::InvalidData(format!(
            "{} trailing bytes after collection elements",
            cursor.remaining()
        )))
    }
}

fn frame(
    context: &PofContext,
    sink: &mut Vec<u8>,
    fill: impl FnOnce(&mut PofWriter<'_>) -> PofResult<()>,
) -> PofResult<()> {
    let mut destination = SlotDestination::new();
    fill(&mut PofWriter::new(context, &mut destination))?;
    destination.write_to(sink)
}

// ============================================================================
// PortableArray
// ============================================================================

/// Array of elements sharing a declared element type.
#[derive(Debug)]
pub struct PortableArray<E> {
    polymorphic: bool,
    element: TypeShape,
    elements: Vec<E>,
}

impl<E> PortableArray<E> {
    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    #[must_use]
    pub fn element_shape(&self) -> &TypeShape {
        &self.element
    }

    /// `PortableArray<element>`
    #[must_use]
    pub fn shape(&self) -> TypeShape {
        TypeShape::portable_array(self.element.clone())
    }

    #[must_use]
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Unwrap into the plain element sequence.
    #[must_use]
    pub fn into_inner(self) -> Vec<E> {
        self.elements
    }
}

impl<'a> PortableArray<&'a dyn Portable> {
    /// Wrap `elements` for writing.
    ///
    /// `polymorphic: None` detects the need for per-element type tags. An
    /// explicit `Some(false)` is overridden when an element is null or of a
    /// type other than the declared one.
    pub fn new(
        context: &PofContext,
        declared: Declared,
        elements: Vec<&'a dyn Portable>,
        polymorphic: Option<bool>,
    ) -> PofResult<Self> {
        let required = needs_type_tags(context, &declared, elements.iter().copied())?;
        Ok(Self {
            polymorphic: choose_polymorphism(polymorphic, required, &declared),
            element: declared.shape,
            elements,
        })
    }

    pub fn from_slice<T: Portable>(
        context: &PofContext,
        items: &'a [T],
        polymorphic: Option<bool>,
    ) -> PofResult<Self> {
        let elements = items.iter().map(|item| item as &dyn Portable).collect();
        Self::new(context, Declared::of::<T>(context)?, elements, polymorphic)
    }

    pub fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        let flags = element_flags(self.polymorphic);
        let mut blob = Vec::new();
        for element in &self.elements {
            write_envelope(writer.context(), &mut blob, *element, flags)?;
        }
        writer.write_boolean(0, self.polymorphic)?;
        writer.write_s32(1, encode_count(self.elements.len())?)?;
        writer.assign_slot(2, Bytes::from(blob))
    }

    /// Write the array frame.
    pub fn encode(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        frame(context, sink, |writer| self.serialize(writer))
    }
}

impl PortableArray<PofValue> {
    /// Read an array frame whose elements are declared as `element`.
    pub fn deserialize(reader: &PofReader<'_>, element: &TypeShape) -> PofResult<Self> {
        let polymorphic = reader.read_boolean(0)?;
        let count = decode_count(reader, 1)?;
        let mut cursor = ByteCursor::new(reader.read_bytes(2)?);
        let mut elements = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            elements.push(decode_element(reader, &mut cursor, polymorphic, element)?);
        }
        expect_consumed(&cursor)?;
        Ok(Self {
            polymorphic,
            element: element.clone(),
            elements,
        })
    }
}

// ============================================================================
// PortableMap
// ============================================================================

/// Map with declared key and value types.
#[derive(Debug)]
pub struct PortableMap<K, V> {
    keys_polymorphic: bool,
    values_polymorphic: bool,
    key: TypeShape,
    value: TypeShape,
    entries: Vec<(K, V)>,
}

impl<K, V> PortableMap<K, V> {
    #[must_use]
    pub fn keys_polymorphic(&self) -> bool {
        self.keys_polymorphic
    }

    #[must_use]
    pub fn values_polymorphic(&self) -> bool {
        self.values_polymorphic
    }

    /// `PortableMap<key, value>`
    #[must_use]
    pub fn shape(&self) -> TypeShape {
        TypeShape::portable_map(self.key.clone(), self.value.clone())
    }

    #[must_use]
    pub fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unwrap into the entries in wire order.
    #[must_use]
    pub fn into_inner(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<'a> PortableMap<&'a dyn Portable, &'a dyn Portable> {
    /// Wrap `entries` for writing. Polymorphism of keys and values is
    /// chosen independently, as for [`PortableArray::new`].
    pub fn new(
        context: &PofContext,
        key: Declared,
        value: Declared,
        entries: Vec<(&'a dyn Portable, &'a dyn Portable)>,
        keys_polymorphic: Option<bool>,
        values_polymorphic: Option<bool>,
    ) -> PofResult<Self> {
        let keys_required = needs_type_tags(context, &key, entries.iter().map(|(k, _)| *k))?;
        let values_required = needs_type_tags(context, &value, entries.iter().map(|(_, v)| *v))?;
        Ok(Self {
            keys_polymorphic: choose_polymorphism(keys_polymorphic, keys_required, &key),
            values_polymorphic: choose_polymorphism(values_polymorphic, values_required, &value),
            key: key.shape,
            value: value.shape,
            entries,
        })
    }

    pub fn from_entries<K, V, I>(
        context: &PofContext,
        entries: I,
        keys_polymorphic: Option<bool>,
        values_polymorphic: Option<bool>,
    ) -> PofResult<Self>
    where
        K: Portable + 'a,
        V: Portable + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k as &dyn Portable, v as &dyn Portable))
            .collect();
        Self::new(
            context,
            Declared::of::<K>(context)?,
            Declared::of::<V>(context)?,
            entries,
            keys_polymorphic,
            values_polymorphic,
        )
    }

    pub fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        let key_flags = element_flags(self.keys_polymorphic);
        let value_flags = element_flags(self.values_polymorphic);
        let mut blob = Vec::new();
        for (key, value) in &self.entries {
            write_envelope(writer.context(), &mut blob, *key, key_flags)?;
            write_envelope(writer.context(), &mut blob, *value, value_flags)?;
        }
        writer.write_boolean(0, self.keys_polymorphic)?;
        writer.write_boolean(1, self.values_polymorphic)?;
        writer.write_s32(2, encode_count(self.entries.len())?)?;
        writer.assign_slot(3, Bytes::from(blob))
    }

    /// Write the map frame.
    pub fn encode(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        frame(context, sink, |writer| self.serialize(writer))
    }
}

impl PortableMap<PofValue, PofValue> {
    /// Read a map frame declared as `PortableMap<key, value>`.
    pub fn deserialize(
        reader: &PofReader<'_>,
        key: &TypeShape,
        value: &TypeShape,
    ) -> PofResult<Self> {
        let keys_polymorphic = reader.read_boolean(0)?;
        let values_polymorphic = reader.read_boolean(1)?;
        let count = decode_count(reader, 2)?;
        let mut cursor = ByteCursor::new(reader.read_bytes(3)?);
        let mut entries = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            let k = decode_element(reader, &mut cursor, keys_polymorphic, key)?;
            let v = decode_element(reader, &mut cursor, values_polymorphic, value)?;
            entries.push((k, v));
        }
        expect_consumed(&cursor)?;
        Ok(Self {
            keys_polymorphic,
            values_polymorphic,
            key: key.clone(),
            value: value.clone(),
            entries,
        })
    }
}
