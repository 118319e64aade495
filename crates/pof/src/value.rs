// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values produced by untyped reads.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::portable::PortableObject;
use crate::types::ReservedTypeId;

/// A decoded value of any wire type.
#[derive(Debug)]
pub enum PofValue {
    Null,

    // Primitives
    S8(i8),
    U8(u8),
    S16(i16),
    U16(u16),
    S32(i32),
    U32(u32),
    S64(i64),
    U64(u64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Bool(bool),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    TimeSpan(TimeDelta),
    Bytes(Bytes),

    // Composites
    Array(Vec<PofValue>),
    /// Entries in wire order.
    Map(Vec<(PofValue, PofValue)>),
    Object(Box<dyn PortableObject>),
}

macro_rules! impl_value_accessors {
    ($($as_fn:ident, $variant:ident, $type:ty);* $(;)?) => {
        $(
            #[must_use]
            pub fn $as_fn(&self) -> Option<$type> {
                match self {
                    Self::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        )*
    };
}

macro_rules! impl_value_from {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for PofValue {
                fn from(v: $type) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl PofValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Reserved id of the wire type, `None` for user objects.
    #[must_use]
    pub fn reserved_id(&self) -> Option<ReservedTypeId> {
        Some(match self {
            Self::Null => ReservedTypeId::Null,
            Self::S8(_) => ReservedTypeId::S8,
            Self::U8(_) => ReservedTypeId::U8,
            Self::S16(_) => ReservedTypeId::S16,
            Self::U16(_) => ReservedTypeId::U16,
            Self::S32(_) => ReservedTypeId::S32,
            Self::U32(_) => ReservedTypeId::U32,
            Self::S64(_) => ReservedTypeId::S64,
            Self::U64(_) => ReservedTypeId::U64,
            Self::Float(_) => ReservedTypeId::Float,
            Self::Double(_) => ReservedTypeId::Double,
            Self::Char(_) => ReservedTypeId::Char,
            Self::String(_) => ReservedTypeId::String,
            Self::Bool(_) => ReservedTypeId::Bool,
            Self::Guid(_) => ReservedTypeId::Guid,
            Self::DateTime(_) => ReservedTypeId::DateTime,
            Self::TimeSpan(_) => ReservedTypeId::TimeSpan,
            Self::Bytes(_) => ReservedTypeId::Bytes,
            Self::Array(_) => ReservedTypeId::PortableArray,
            Self::Map(_) => ReservedTypeId::PortableMap,
            Self::Object(_) => return None,
        })
    }

    /// Short name used in mismatch errors.
    #[must_use]
    pub fn kind_name(&self) -> String {
        match self {
            Self::Object(object) => (**object).type_key().name().to_string(),
            other => other
                .reserved_id()
                .map_or("object", ReservedTypeId::name)
                .to_string(),
        }
    }

    impl_value_accessors! {
        as_s8, S8, i8;
        as_u8, U8, u8;
        as_s16, S16, i16;
        as_u16, U16, u16;
        as_s32, S32, i32;
        as_u32, U32, u32;
        as_s64, S64, i64;
        as_u64, U64, u64;
        as_float, Float, f32;
        as_double, Double, f64;
        as_char, Char, char;
        as_bool, Bool, bool;
        as_guid, Guid, Uuid;
        as_date_time, DateTime, DateTime<Utc>;
        as_time_span, TimeSpan, TimeDelta;
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[PofValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(PofValue, PofValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrow a user object as its concrete type.
    #[must_use]
    pub fn as_object<T: PortableObject>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => (**object).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl_value_from! {
    i8 => S8,
    u8 => U8,
    i16 => S16,
    u16 => U16,
    i32 => S32,
    u32 => U32,
    i64 => S64,
    u64 => U64,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    bool => Bool,
    Uuid => Guid,
    DateTime<Utc> => DateTime,
    TimeDelta => TimeSpan,
    Bytes => Bytes,
    Vec<PofValue> => Array,
    Box<dyn PortableObject> => Object,
}

impl From<&str> for PofValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<PofValue>> From<Option<T>> for PofValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(PofValue::from(42i32).as_s32(), Some(42));
        assert_eq!(PofValue::from(42i32).as_s64(), None);
        assert_eq!(PofValue::from("hi").as_str(), Some("hi"));
        assert!(PofValue::from(None::<i32>).is_null());
        assert_eq!(PofValue::from(Some(true)).as_bool(), Some(true));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(PofValue::Null.kind_name(), "null");
        assert_eq!(PofValue::from(1u16).kind_name(), "u16");
        assert_eq!(PofValue::Array(Vec::new()).kind_name(), "portable-array");
    }
}
