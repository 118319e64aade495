// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptions.
//!
//! On the wire a description is a pre-order sequence of `int32` ids: one id
//! per type, followed by the descriptions of its generic arguments.

use std::fmt;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::registry::PofContext;
use super::reserved::ReservedTypeId;
use crate::error::{PofError, PofResult};
use crate::ser::cursor::ByteCursor;

/// Structural description of a (possibly generic) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Non-generic type.
    Leaf(i32),
    /// Generic definition applied to its arguments.
    Generic { head: i32, args: Vec<TypeShape> },
    /// Single-dimensional array of the element type.
    Array(Box<TypeShape>),
}

impl TypeShape {
    #[must_use]
    pub fn reserved(id: ReservedTypeId) -> Self {
        Self::Leaf(id.id())
    }

    #[must_use]
    pub fn null() -> Self {
        Self::reserved(ReservedTypeId::Null)
    }

    #[must_use]
    pub fn object() -> Self {
        Self::reserved(ReservedTypeId::Object)
    }

    #[must_use]
    pub fn array(element: TypeShape) -> Self {
        Self::Array(Box::new(element))
    }

    /// `PortableArray<element>`
    #[must_use]
    pub fn portable_array(element: TypeShape) -> Self {
        Self::Generic {
            head: ReservedTypeId::PortableArray.id(),
            args: vec![element],
        }
    }

    /// `PortableMap<key, value>`
    #[must_use]
    pub fn portable_map(key: TypeShape, value: TypeShape) -> Self {
        Self::Generic {
            head: ReservedTypeId::PortableMap.id(),
            args: vec![key, value],
        }
    }

    /// First id of the flattened description.
    #[must_use]
    pub fn head(&self) -> i32 {
        match self {
            Self::Leaf(id) => *id,
            Self::Generic { head, .. } => *head,
            Self::Array(_) => ReservedTypeId::Array.id(),
        }
    }

    #[must_use]
    pub fn reserved_head(&self) -> Option<ReservedTypeId> {
        ReservedTypeId::from_id(self.head())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Leaf(id) if *id == ReservedTypeId::Null.id())
    }

    /// Element description of an array or `PortableArray`.
    #[must_use]
    pub fn element(&self) -> Option<&TypeShape> {
        match self {
            Self::Array(element) => Some(element),
            Self::Generic { head, args }
                if *head == ReservedTypeId::PortableArray.id() && args.len() == 1 =>
            {
                Some(&args[0])
            }
            _ => None,
        }
    }

    /// Key and value descriptions of a `PortableMap`.
    #[must_use]
    pub fn entry(&self) -> Option<(&TypeShape, &TypeShape)> {
        match self {
            Self::Generic { head, args }
                if *head == ReservedTypeId::PortableMap.id() && args.len() == 2 =>
            {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// Same shape with every `PortableArray<T>` written as `T[]`.
    #[must_use]
    pub fn canonical(&self) -> Self {
        if let Some(element) = self.element() {
            return Self::array(element.canonical());
        }
        match self {
            Self::Generic { head, args } => Self::Generic {
                head: *head,
                args: args.iter().map(Self::canonical).collect(),
            },
            leaf => leaf.clone(),
        }
    }

    /// Whether both descriptions decode to the same type.
    #[must_use]
    pub fn denotes_same_type(&self, other: &Self) -> bool {
        self == other || self.canonical() == other.canonical()
    }

    /// Pre-order id sequence.
    #[must_use]
    pub fn flatten(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        self.flatten_into(&mut ids);
        ids
    }

    fn flatten_into(&self, ids: &mut Vec<i32>) {
        ids.push(self.head());
        match self {
            Self::Leaf(_) => {}
            Self::Generic { args, .. } => {
                for arg in args {
                    arg.flatten_into(ids);
                }
            }
            Self::Array(element) => element.flatten_into(ids),
        }
    }

    pub fn write_to<W: Write>(&self, sink: &mut W) -> PofResult<()> {
        for id in self.flatten() {
            sink.write_i32::<LittleEndian>(id)?;
        }
        Ok(())
    }

    /// Parse one description, looking up each id's arity in `context`.
    ///
    /// Unknown ids fail with [`PofError::TypeIdNotFound`].
    pub fn parse(cursor: &mut ByteCursor, context: &PofContext) -> PofResult<Self> {
        Self::parse_at(cursor, context, 0)
    }

    fn parse_at(cursor: &mut ByteCursor, context: &PofContext, depth: usize) -> PofResult<Self> {
        let limit = context.config().max_depth;
        if depth > limit {
            return Err(PofError::LimitExceeded {
                what: "type description depth",
                limit,
            });
        }
        let id = cursor.read_i32_le()?;
        let arity = context.arity_of(id).ok_or(PofError::TypeIdNotFound(id))?;
        if id == ReservedTypeId::Array.id() {
            let element = Self::parse_at(cursor, context, depth + 1)?;
            return Ok(Self::array(element));
        }
        if arity == 0 {
            return Ok(Self::Leaf(id));
        }
        let args = (0..arity)
            .map(|_| Self::parse_at(cursor, context, depth + 1))
            .collect::<PofResult<Vec<_>>>()?;
        Ok(Self::Generic { head: id, args })
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(id) => write_id(f, *id),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Generic { head, args } => {
                write_id(f, *head)?;
                f.write_str("<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

fn write_id(f: &mut fmt::Formatter<'_>, id: i32) -> fmt::Result {
    match ReservedTypeId::from_id(id) {
        Some(reserved) => f.write_str(reserved.name()),
        None => write!(f, "#{id}"),
    }
}
