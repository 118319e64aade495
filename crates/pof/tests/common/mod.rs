// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared model types for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt::Debug;

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use pof::{
    activator, Activator, GenericDefinition, PofContext, PofReader, PofResult, PofWriter,
    Portable, PortableObject, ReservedTypeId, TypeShape,
};
use uuid::Uuid;

pub const PERSON_ID: i32 = 1;
pub const NODE_ID: i32 = 2;
pub const WRAPPER_ID: i32 = 3;
pub const CIRCLE_ID: i32 = 4;
pub const SQUARE_ID: i32 = 5;
pub const INVENTORY_ID: i32 = 6;
pub const ALL_KINDS_ID: i32 = 7;
pub const SAMPLES_ID: i32 = 8;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Context with every model type registered.
pub fn context() -> PofContext {
    init_logging();
    let mut context = PofContext::new();
    context.register_type::<Person>(PERSON_ID).expect("register Person");
    context.register_type::<Node>(NODE_ID).expect("register Node");
    context
        .register_generic::<WrapperDefinition>(WRAPPER_ID)
        .expect("register Wrapper");
    context.register_type::<Circle>(CIRCLE_ID).expect("register Circle");
    context.register_type::<Square>(SQUARE_ID).expect("register Square");
    context
        .register_type::<Inventory>(INVENTORY_ID)
        .expect("register Inventory");
    context
        .register_type::<AllKinds>(ALL_KINDS_ID)
        .expect("register AllKinds");
    context.register_type::<Samples>(SAMPLES_ID).expect("register Samples");
    context
}

// ============================================================================
// Plain objects
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: Option<String>,
    pub age: i32,
    pub email: Option<String>,
    pub nicknames: Vec<String>,
}

impl PortableObject for Person {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_object(0, &self.name)?;
        writer.write_s32(1, self.age)?;
        writer.write_object(2, &self.email)?;
        writer.write_collection(3, &self.nicknames, false)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.name = reader.read_object(0)?;
        self.age = reader.read_s32(1)?;
        self.email = reader.read_object(2)?;
        self.nicknames = reader.read_array(3)?.unwrap_or_default();
        Ok(())
    }
}

/// Tree node with an optional link to a sibling.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub weight: f64,
    pub children: Vec<Node>,
    pub next: Option<Box<Node>>,
}

impl Node {
    pub fn leaf(label: &str, weight: f64) -> Self {
        Self {
            label: label.to_string(),
            weight,
            ..Self::default()
        }
    }
}

impl PortableObject for Node {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_string(0, &self.label)?;
        writer.write_double(1, self.weight)?;
        writer.write_collection(2, &self.children, false)?;
        writer.write_object(3, &self.next)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.label = reader.read_string(0)?;
        self.weight = reader.read_double(1)?;
        self.children = reader.read_array(2)?.unwrap_or_default();
        self.next = reader.read_object(3)?;
        Ok(())
    }
}

// ============================================================================
// Generic objects
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Wrapper<T> {
    pub value: T,
    pub revision: u32,
}

impl<T> PortableObject for Wrapper<T>
where
    T: Portable + Default + Debug + Send + Sync + 'static,
{
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_object(0, &self.value)?;
        writer.write_u32(1, self.revision)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.value = reader.read_object(0)?;
        self.revision = reader.read_u32(1)?;
        Ok(())
    }

    fn type_shape(&self, context: &PofContext) -> PofResult<TypeShape> {
        Self::static_shape(context)
    }

    fn static_shape(context: &PofContext) -> PofResult<TypeShape> {
        context.generic_shape::<WrapperDefinition>(vec![T::declared_shape(context)?])
    }
}

/// `Wrapper<T>` for `T` in {s32, string}.
pub struct WrapperDefinition;

impl GenericDefinition for WrapperDefinition {
    const ARITY: usize = 1;

    fn instantiate(args: &[TypeShape]) -> Option<Activator> {
        match args.first()?.reserved_head()? {
            ReservedTypeId::S32 => Some(activator::<Wrapper<i32>>()),
            ReservedTypeId::String => Some(activator::<Wrapper<String>>()),
            _ => None,
        }
    }
}

// ============================================================================
// Polymorphic objects
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Square {
    pub side: f32,
    pub label: String,
}

impl PortableObject for Circle {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_double(0, self.radius)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.radius = reader.read_double(0)?;
        Ok(())
    }
}

impl PortableObject for Square {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_float(0, self.side)?;
        writer.write_string(1, &self.label)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.side = reader.read_float(0)?;
        self.label = reader.read_string(1)?;
        Ok(())
    }
}

// ============================================================================
// Maps and collections
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Inventory {
    pub counts: Option<HashMap<String, i32>>,
    pub owner: String,
}

impl PortableObject for Inventory {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_map(0, self.counts.as_ref(), false, false)?;
        writer.write_string(1, &self.owner)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.counts = reader.read_map(0)?;
        self.owner = reader.read_string(1)?;
        Ok(())
    }
}

/// One collection written with a chosen polymorphism flag.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Samples {
    pub values: Vec<i32>,
    pub polymorphic: bool,
}

impl PortableObject for Samples {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_collection(0, &self.values, self.polymorphic)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.values = reader.read_collection(0)?.unwrap_or_default();
        Ok(())
    }
}

// ============================================================================
// Every slot kind
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AllKinds {
    pub s8: i8,
    pub u8: u8,
    pub s16: i16,
    pub u16: u16,
    pub s32: i32,
    pub u32: u32,
    pub s64: i64,
    pub u64: u64,
    pub float: f32,
    pub double: f64,
    pub char: char,
    pub string: String,
    pub boolean: bool,
    pub guid: Uuid,
    pub date_time: DateTime<Utc>,
    pub time_span: TimeDelta,
    pub raw: Bytes,
    pub blob: Bytes,
}

impl Default for AllKinds {
    fn default() -> Self {
        Self {
            s8: 0,
            u8: 0,
            s16: 0,
            u16: 0,
            s32: 0,
            u32: 0,
            s64: 0,
            u64: 0,
            float: 0.0,
            double: 0.0,
            char: '\0',
            string: String::new(),
            boolean: false,
            guid: Uuid::nil(),
            date_time: DateTime::default(),
            time_span: TimeDelta::zero(),
            raw: Bytes::new(),
            blob: Bytes::new(),
        }
    }
}

impl AllKinds {
    /// Random values, restricted to what each encoding represents exactly.
    pub fn random() -> Self {
        let bmp = char::from_u32(fastrand::u32(0x20..0xD800)).unwrap_or('x');
        let seconds = fastrand::i64(-62_135_596_800..253_402_300_799);
        let ticks = fastrand::u32(0..10_000_000);
        let raw: Vec<u8> = (0..fastrand::usize(0..64)).map(|_| fastrand::u8(..)).collect();
        let blob: Vec<u8> = (0..fastrand::usize(0..64)).map(|_| fastrand::u8(..)).collect();
        Self {
            s8: fastrand::i8(..),
            u8: fastrand::u8(..),
            s16: fastrand::i16(..),
            u16: fastrand::u16(..),
            s32: fastrand::i32(..),
            u32: fastrand::u32(..),
            s64: fastrand::i64(..),
            u64: fastrand::u64(..),
            float: fastrand::f32() * 1.0e6 - 5.0e5,
            double: fastrand::f64() * 1.0e12 - 5.0e11,
            char: bmp,
            string: (0..fastrand::usize(0..32)).map(|_| fastrand::alphanumeric()).collect(),
            boolean: fastrand::bool(),
            guid: Uuid::new_v4(),
            date_time: DateTime::from_timestamp(seconds, ticks * 100).unwrap_or_default(),
            time_span: TimeDelta::new(fastrand::i64(-1_000_000_000..1_000_000_000), ticks * 100)
                .unwrap_or_default(),
            raw: Bytes::from(raw),
            blob: Bytes::from(blob),
        }
    }
}

impl PortableObject for AllKinds {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_s8(0, self.s8)?;
        writer.write_u8(1, self.u8)?;
        writer.write_s16(2, self.s16)?;
        writer.write_u16(3, self.u16)?;
        writer.write_s32(4, self.s32)?;
        writer.write_u32(5, self.u32)?;
        writer.write_s64(6, self.s64)?;
        writer.write_u64(7, self.u64)?;
        writer.write_float(8, self.float)?;
        writer.write_double(9, self.double)?;
        writer.write_char(10, self.char)?;
        writer.write_string(11, &self.string)?;
        writer.write_boolean(12, self.boolean)?;
        writer.write_guid(13, self.guid)?;
        writer.write_date_time(14, self.date_time)?;
        writer.write_time_span(15, self.time_span)?;
        writer.write_bytes(16, &self.raw)?;
        writer.write_object(17, &self.blob)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.s8 = reader.read_s8(0)?;
        self.u8 = reader.read_u8(1)?;
        self.s16 = reader.read_s16(2)?;
        self.u16 = reader.read_u16(3)?;
        self.s32 = reader.read_s32(4)?;
        self.u32 = reader.read_u32(5)?;
        self.s64 = reader.read_s64(6)?;
        self.u64 = reader.read_u64(7)?;
        self.float = reader.read_float(8)?;
        self.double = reader.read_double(9)?;
        self.char = reader.read_char(10)?;
        self.string = reader.read_string(11)?;
        self.boolean = reader.read_boolean(12)?;
        self.guid = reader.read_guid(13)?;
        self.date_time = reader.read_date_time(14)?;
        self.time_span = reader.read_time_span(15)?;
        self.raw = reader.read_bytes(16)?;
        self.blob = reader.read_object(17)?;
        Ok(())
    }
}

pof::portable_object!(Person, Node, Circle, Square, Inventory, Samples, AllKinds);
pof::portable_object!(<T> Wrapper<T>);
