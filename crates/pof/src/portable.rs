// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization capabilities.
//!
//! [`PortableObject`] is implemented by user types that decompose into
//! slots. [`Portable`] is the typed adapter every writable value carries:
//! the declared and runtime type descriptions, the payload encoding and the
//! conversion back from a decoded [`PofValue`]. Primitives, strings, options,
//! boxes, vectors and maps implement it here; user types opt in with
//! [`portable_object!`](crate::portable_object).

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{PofError, PofResult};
use crate::reader::PofReader;
use crate::ser::primitives;
use crate::slot::SlotDestination;
use crate::types::{PofContext, ReservedTypeId, TypeKey, TypeShape};
use crate::value::PofValue;
use crate::wrappers::{Declared, PortableArray, PortableMap};
use crate::writer::PofWriter;

// ============================================================================
// Object capability
// ============================================================================

/// Dynamic typing helpers, implemented for every `'static` thread-safe type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
    fn type_key(&self) -> TypeKey;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }
}

/// A user type that writes its fields into slots and reads them back.
///
/// Generic types override both `type_shape` and `static_shape` to describe
/// their instantiation.
pub trait PortableObject: AsAny + fmt::Debug {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()>;

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()>;

    /// Description of this value's concrete type.
    fn type_shape(&self, context: &PofContext) -> PofResult<TypeShape> {
        context.shape_of_key(self.type_key())
    }

    /// Description of `Self`.
    fn static_shape(context: &PofContext) -> PofResult<TypeShape>
    where
        Self: Sized,
    {
        context.shape_of::<Self>()
    }
}

impl dyn PortableObject {
    #[must_use]
    pub fn key(&self) -> TypeKey {
        AsAny::type_key(self)
    }

    #[must_use]
    pub fn downcast_ref<T: PortableObject>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    /// Move out the concrete value.
    pub fn downcast<T: PortableObject>(self: Box<Self>) -> PofResult<T> {
        let found = self.key();
        AsAny::into_any(self)
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| PofError::mismatch(type_name::<T>(), found.name()))
    }
}

/// Write `object` as a nested slot frame.
pub fn encode_object(
    object: &dyn PortableObject,
    context: &PofContext,
    sink: &mut Vec<u8>,
) -> PofResult<()> {
    let mut destination = SlotDestination::new();
    object.serialize(&mut PofWriter::new(context, &mut destination))?;
    log::trace!(
        "[pof::portable] {} framed in {} slots ({} bytes)",
        object.key(),
        destination.len(),
        destination.encoded_len()
    );
    destination.write_to(sink)
}

pub fn object_from_value<T: PortableObject>(value: PofValue) -> PofResult<T> {
    match value {
        PofValue::Object(object) => object.downcast::<T>(),
        other => Err(PofError::mismatch(type_name::<T>(), other.kind_name())),
    }
}

// ============================================================================
// Typed adapter capability
// ============================================================================

/// A value the writer and reader know how to describe and encode.
pub trait Portable {
    /// Statically known description, used for typeless element encoding.
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape>
    where
        Self: Sized;

    /// Whether every value has exactly the declared type (never null).
    fn is_value_type() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Description of this value's runtime type; `None` for null.
    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>>;

    /// Encoding that follows the type description.
    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()>;

    fn from_value(value: PofValue) -> PofResult<Self>
    where
        Self: Sized;
}

/// Implement [`Portable`] for types implementing [`PortableObject`].
///
/// ```ignore
/// pof::portable_object!(Node, Leaf);
/// pof::portable_object!(<T> Wrapper<T>);
/// ```
#[macro_export]
macro_rules! portable_object {
    (@body) => {
        fn declared_shape(
            context: &$crate::PofContext,
        ) -> $crate::PofResult<$crate::TypeShape> {
            <Self as $crate::PortableObject>::static_shape(context)
        }

        fn runtime_shape(
            &self,
            context: &$crate::PofContext,
        ) -> $crate::PofResult<::core::option::Option<$crate::TypeShape>> {
            $crate::PortableObject::type_shape(self, context).map(::core::option::Option::Some)
        }

        fn encode_payload(
            &self,
            context: &$crate::PofContext,
            sink: &mut ::std::vec::Vec<u8>,
        ) -> $crate::PofResult<()> {
            $crate::portable::encode_object(self, context, sink)
        }

        fn from_value(value: $crate::PofValue) -> $crate::PofResult<Self> {
            $crate::portable::object_from_value(value)
        }
    };
    (<$($param:ident),+> $type:ty) => {
        impl<$($param: $crate::Portable),+> $crate::Portable for $type
        where
            $type: $crate::PortableObject,
        {
            $crate::portable_object!(@body);
        }
    };
    ($($type:ty),+ $(,)?) => {
        $(
            impl $crate::Portable for $type {
                $crate::portable_object!(@body);
            }
        )+
    };
}

// ============================================================================
// Primitives
// ============================================================================

macro_rules! impl_portable_primitive {
    ($($type:ty => $variant:ident, $reserved:ident, $value_type:expr);* $(;)?) => {
        $(
            impl Portable for $type {
                fn declared_shape(_: &PofContext) -> PofResult<TypeShape> {
                    Ok(TypeShape::reserved(ReservedTypeId::$reserved))
                }

                fn is_value_type() -> bool {
                    $value_type
                }

                fn runtime_shape(&self, _: &PofContext) -> PofResult<Option<TypeShape>> {
                    Ok(Some(TypeShape::reserved(ReservedTypeId::$reserved)))
                }

                #[allow(clippy::clone_on_copy)]
                fn encode_payload(&self, _: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
                    primitives::encode(&PofValue::$variant(self.clone()), sink)
                }

                fn from_value(value: PofValue) -> PofResult<Self> {
                    match value {
                        PofValue::$variant(v) => Ok(v),
                        other => Err(PofError::mismatch(
                            ReservedTypeId::$reserved.name(),
                            other.kind_name(),
                        )),
                    }
                }
            }
        )*
    };
}

impl_portable_primitive! {
    i8 => S8, S8, true;
    u8 => U8, U8, true;
    i16 => S16, S16, true;
    u16 => U16, U16, true;
    i32 => S32, S32, true;
    u32 => U32, U32, true;
    i64 => S64, S64, true;
    u64 => U64, U64, true;
    f32 => Float, Float, true;
    f64 => Double, Double, true;
    char => Char, Char, true;
    bool => Bool, Bool, true;
    Uuid => Guid, Guid, true;
    DateTime<Utc> => DateTime, DateTime, true;
    TimeDelta => TimeSpan, TimeSpan, true;
    Bytes => Bytes, Bytes, false;
}

impl Portable for String {
    fn declared_shape(_: &PofContext) -> PofResult<TypeShape> {
        Ok(TypeShape::reserved(ReservedTypeId::String))
    }

    fn runtime_shape(&self, _: &PofContext) -> PofResult<Option<TypeShape>> {
        Ok(Some(TypeShape::reserved(ReservedTypeId::String)))
    }

    fn encode_payload(&self, _: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        primitives::encode_string(self, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        match value {
            PofValue::String(s) => Ok(s),
            other => Err(PofError::mismatch("string", other.kind_name())),
        }
    }
}

// ============================================================================
// Dynamic values
// ============================================================================

impl Portable for PofValue {
    fn declared_shape(_: &PofContext) -> PofResult<TypeShape> {
        Ok(TypeShape::object())
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        Ok(match self {
            Self::Null => None,
            Self::Array(_) => Some(TypeShape::portable_array(TypeShape::object())),
            Self::Map(_) => Some(TypeShape::portable_map(
                TypeShape::object(),
                TypeShape::object(),
            )),
            Self::Object(object) => Some(object.type_shape(context)?),
            primitive => primitive.reserved_id().map(TypeShape::reserved),
        })
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        match self {
            Self::Null => Ok(()),
            Self::Array(items) => {
                let elements = items.iter().map(|item| item as &dyn Portable).collect();
                PortableArray::new(context, Declared::object(), elements, None)?
                    .encode(context, sink)
            }
            Self::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(k, v)| (k as &dyn Portable, v as &dyn Portable))
                    .collect();
                PortableMap::new(
                    context,
                    Declared::object(),
                    Declared::object(),
                    entries,
                    None,
                    None,
                )?
                .encode(context, sink)
            }
            Self::Object(object) => encode_object(object.as_ref(), context, sink),
            primitive => primitives::encode(primitive, sink),
        }
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        Ok(value)
    }
}

impl Portable for Box<dyn PortableObject> {
    fn declared_shape(_: &PofContext) -> PofResult<TypeShape> {
        Ok(TypeShape::object())
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        self.as_ref().type_shape(context).map(Some)
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        encode_object(self.as_ref(), context, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        match value {
            PofValue::Object(object) => Ok(object),
            other => Err(PofError::mismatch("object", other.kind_name())),
        }
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: Portable> Portable for Option<T> {
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape> {
        T::declared_shape(context)
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        match self {
            Some(value) => value.runtime_shape(context),
            None => Ok(None),
        }
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        match self {
            Some(value) => value.encode_payload(context, sink),
            None => Ok(()),
        }
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

impl<T: Portable> Portable for Box<T> {
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape> {
        T::declared_shape(context)
    }

    fn is_value_type() -> bool {
        T::is_value_type()
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        self.as_ref().runtime_shape(context)
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        self.as_ref().encode_payload(context, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Portable> Portable for Vec<T> {
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape> {
        Ok(TypeShape::array(T::declared_shape(context)?))
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        Ok(Some(TypeShape::portable_array(T::declared_shape(context)?)))
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        PortableArray::from_slice(context, self, None)?.encode(context, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        match value {
            PofValue::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(PofError::mismatch("array", other.kind_name())),
        }
    }
}

fn map_shape<K: Portable, V: Portable>(context: &PofContext) -> PofResult<TypeShape> {
    Ok(TypeShape::portable_map(
        K::declared_shape(context)?,
        V::declared_shape(context)?,
    ))
}

fn map_entries(value: PofValue) -> PofResult<Vec<(PofValue, PofValue)>> {
    match value {
        PofValue::Map(entries) => Ok(entries),
        other => Err(PofError::mismatch("map", other.kind_name())),
    }
}

fn duplicate_key() -> PofError {
    PofError::InvalidData("duplicate map key".to_string())
}

impl<K, V, S> Portable for HashMap<K, V, S>
where
    K: Portable + Eq + Hash,
    V: Portable,
    S: BuildHasher + Default,
{
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape> {
        map_shape::<K, V>(context)
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        map_shape::<K, V>(context).map(Some)
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        PortableMap::from_entries(context, self, None, None)?.encode(context, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        let entries = map_entries(value)?;
        let mut map = HashMap::with_capacity_and_hasher(entries.len(), S::default());
        for (key, value) in entries {
            if map.insert(K::from_value(key)?, V::from_value(value)?).is_some() {
                return Err(duplicate_key());
            }
        }
        Ok(map)
    }
}

impl<K, V> Portable for BTreeMap<K, V>
where
    K: Portable + Ord,
    V: Portable,
{
    fn declared_shape(context: &PofContext) -> PofResult<TypeShape> {
        map_shape::<K, V>(context)
    }

    fn runtime_shape(&self, context: &PofContext) -> PofResult<Option<TypeShape>> {
        map_shape::<K, V>(context).map(Some)
    }

    fn encode_payload(&self, context: &PofContext, sink: &mut Vec<u8>) -> PofResult<()> {
        PortableMap::from_entries(context, self, None, None)?.encode(context, sink)
    }

    fn from_value(value: PofValue) -> PofResult<Self> {
        let mut map = BTreeMap::new();
        for (key, value) in map_entries(value)? {
            if map.insert(K::from_value(key)?, V::from_value(value)?).is_some() {
                return Err(duplicate_key());
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl PortableObject for Point {
        fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
            writer.write_s32(0, self.x)?;
            writer.write_s32(1, self.y)
        }

        fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
            self.x = reader.read_s32(0)?;
            self.y = reader.read_s32(1)?;
            Ok(())
        }
    }

    crate::portable_object!(Point);

    fn context() -> PofContext {
        let mut context = PofContext::new();
        context.register_type::<Point>(1).expect("register Point");
        context
    }

    #[test]
    fn test_declared_shapes() {
        let context = context();
        assert_eq!(
            Vec::<Option<Point>>::declared_shape(&context).expect("shape"),
            TypeShape::array(TypeShape::Leaf(1))
        );
        assert_eq!(
            HashMap::<String, Vec<f32>>::declared_shape(&context).expect("shape"),
            TypeShape::portable_map(
                TypeShape::reserved(ReservedTypeId::String),
                TypeShape::array(TypeShape::reserved(ReservedTypeId::Float)),
            )
        );
        assert!(i64::is_value_type());
        assert!(!String::is_value_type());
        assert!(!Option::<i64>::is_value_type());
    }

    #[test]
    fn test_runtime_shape_of_null() {
        let context = context();
        assert_eq!(None::<Point>.runtime_shape(&context).expect("shape"), None);
        assert_eq!(PofValue::Null.runtime_shape(&context).expect("shape"), None);
        assert_eq!(
            Some(Point::default()).runtime_shape(&context).expect("shape"),
            Some(TypeShape::Leaf(1))
        );
    }

    #[test]
    fn test_unregistered_object_has_no_shape() {
        let context = PofContext::new();
        match Point::default().runtime_shape(&context) {
            Err(PofError::TypeNotFound { type_name }) => assert!(type_name.ends_with("Point")),
            other => std::panic::panic_any(format!("{other:?}")),
        }
    }

    #[test]
    fn test_downcast() {
        let boxed: Box<dyn PortableObject> = Box::new(Point { x: 1, y: 2 });
        assert!(boxed.key().name().ends_with("Point"));
        assert_eq!(boxed.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
        let point: Point = object_from_value(PofValue::Object(boxed)).expect("downcast");
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_from_value_mismatch() {
        assert!(matches!(
            i32::from_value(PofValue::from("7")),
            Err(PofError::TypeMismatch { .. })
        ));
        assert!(matches!(
            object_from_value::<Point>(PofValue::Null),
            Err(PofError::TypeMismatch { .. })
        ));
        let duplicated = PofValue::Map(vec![
            (PofValue::S32(1), PofValue::Bool(true)),
            (PofValue::S32(1), PofValue::Bool(false)),
        ]);
        assert!(matches!(
            HashMap::<i32, bool>::from_value(duplicated),
            Err(PofError::InvalidData(_))
        ));
    }
}
