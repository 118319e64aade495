// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reserved (negative) type ids built into every registry.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::key::TypeKey;
use crate::value::PofValue;

/// Marker types standing in for reserved ids without a natural Rust type.
pub mod markers {
    /// Untyped sequence of objects.
    #[derive(Debug)]
    pub struct Enumerable;
    /// Generic array marker, followed by the element description.
    #[derive(Debug)]
    pub struct Array;
    /// Sequence wrapper definition.
    #[derive(Debug)]
    pub struct PortableArray;
    /// Mapping wrapper definition.
    #[derive(Debug)]
    pub struct PortableMap;
}

/// Built-in type ids. Values are part of the wire format.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedTypeId {
    S8 = -1,
    U8 = -2,
    S16 = -3,
    U16 = -4,
    S32 = -5,
    U32 = -6,
    S64 = -7,
    U64 = -8,
    Float = -9,
    Double = -10,
    Char = -11,
    String = -12,
    Bool = -13,
    Guid = -14,
    Null = -15,
    Object = -16,
    Enumerable = -17,
    DateTime = -18,
    Bytes = -19,
    PortableArray = -20,
    PortableMap = -21,
    Array = -22,
    TimeSpan = -23,
}

impl ReservedTypeId {
    pub const ALL: [Self; 23] = [
        Self::S8,
        Self::U8,
        Self::S16,
        Self::U16,
        Self::S32,
        Self::U32,
        Self::S64,
        Self::U64,
        Self::Float,
        Self::Double,
        Self::Char,
        Self::String,
        Self::Bool,
        Self::Guid,
        Self::Null,
        Self::Object,
        Self::Enumerable,
        Self::DateTime,
        Self::Bytes,
        Self::PortableArray,
        Self::PortableMap,
        Self::Array,
        Self::TimeSpan,
    ];

    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        // ids are contiguous: -1 maps to ALL[0]
        let index = usize::try_from(-(i64::from(id)) - 1).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Number of nested descriptions that follow this id on the wire.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::PortableArray | Self::Array => 1,
            Self::PortableMap => 2,
            _ => 0,
        }
    }

    /// Fixed-width or length-prefixed primitive kinds.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !matches!(
            self,
            Self::Null
                | Self::Object
                | Self::Enumerable
                | Self::PortableArray
                | Self::PortableMap
                | Self::Array
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::S8 => "s8",
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::U16 => "u16",
            Self::S32 => "s32",
            Self::U32 => "u32",
            Self::S64 => "s64",
            Self::U64 => "u64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Guid => "guid",
            Self::Null => "null",
            Self::Object => "object",
            Self::Enumerable => "enumerable",
            Self::DateTime => "datetime",
            Self::Bytes => "bytes",
            Self::PortableArray => "portable-array",
            Self::PortableMap => "portable-map",
            Self::Array => "array",
            Self::TimeSpan => "timespan",
        }
    }

    /// Rust type bound to this id in every registry.
    #[must_use]
    pub fn key(self) -> TypeKey {
        match self {
            Self::S8 => TypeKey::of::<i8>(),
            Self::U8 => TypeKey::of::<u8>(),
            Self::S16 => TypeKey::of::<i16>(),
            Self::U16 => TypeKey::of::<u16>(),
            Self::S32 => TypeKey::of::<i32>(),
            Self::U32 => TypeKey::of::<u32>(),
            Self::S64 => TypeKey::of::<i64>(),
            Self::U64 => TypeKey::of::<u64>(),
            Self::Float => TypeKey::of::<f32>(),
            Self::Double => TypeKey::of::<f64>(),
            Self::Char => TypeKey::of::<char>(),
            Self::String => TypeKey::of::<String>(),
            Self::Bool => TypeKey::of::<bool>(),
            Self::Guid => TypeKey::of::<Uuid>(),
            Self::Null => TypeKey::of::<()>(),
            Self::Object => TypeKey::of::<PofValue>(),
            Self::Enumerable => TypeKey::of::<markers::Enumerable>(),
            Self::DateTime => TypeKey::of::<DateTime<Utc>>(),
            Self::Bytes => TypeKey::of::<Bytes>(),
            Self::PortableArray => TypeKey::of::<markers::PortableArray>(),
            Self::PortableMap => TypeKey::of::<markers::PortableMap>(),
            Self::Array => TypeKey::of::<markers::Array>(),
            Self::TimeSpan => TypeKey::of::<TimeDelta>(),
        }
    }
}
