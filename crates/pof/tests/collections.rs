// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact round trips

//! Collection encodings: polymorphism flags, nesting and typed reads.

mod common;

use std::collections::{BTreeSet, HashMap, VecDeque};

use common::*;
use pof::{
    PofReader, PofResult, PofSerializer, PofValue, PofWriter, PortableObject, ReservedTypeId,
    SlotDestination, TypeShape,
};

#[test]
fn test_monomorphic_array_is_smaller() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let values: Vec<i32> = (0..100).map(|_| fastrand::i32(..)).collect();

    let monomorphic = Samples {
        values: values.clone(),
        polymorphic: false,
    };
    let polymorphic = Samples {
        values: values.clone(),
        polymorphic: true,
    };
    let mono_bytes = serializer.to_bytes(&monomorphic).expect("monomorphic");
    let poly_bytes = serializer.to_bytes(&polymorphic).expect("polymorphic");

    // One type id per element.
    assert_eq!(poly_bytes.len() - mono_bytes.len(), 4 * values.len());

    let from_mono: Samples = serializer.from_bytes(&mono_bytes).expect("decode monomorphic");
    let from_poly: Samples = serializer.from_bytes(&poly_bytes).expect("decode polymorphic");
    assert_eq!(from_mono.values, values);
    assert_eq!(from_poly.values, values);
}

#[test]
fn test_monomorphic_request_with_null_element() {
    let context = context();
    let mut destination = SlotDestination::new();
    let names = vec![Some("a".to_string()), None, Some("c".to_string())];
    PofWriter::new(&context, &mut destination)
        .write_collection(0, &names, false)
        .expect("promoted to polymorphic");

    let bytes = destination.to_bytes().expect("frame");
    let mut cursor = pof::ser::cursor::ByteCursor::new(bytes.into());
    let slots = pof::SlotSource::read_from(&mut cursor, context.config()).expect("slots");
    let reader = PofReader::new(&context, slots);
    let decoded: Vec<Option<String>> = reader.read_array(0).expect("read").expect("not null");
    assert_eq!(decoded, names);
}

#[test]
fn test_nested_description() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let matrix = vec![vec![1.0f32, 2.0], vec![], vec![3.5]];
    let bytes = serializer.to_bytes(&matrix).expect("serialize");

    // envelope length, slot count, slot 0 length, then the description
    let ids: Vec<i32> = bytes[12..24]
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(
        ids,
        vec![
            ReservedTypeId::PortableArray.id(),
            ReservedTypeId::Array.id(),
            ReservedTypeId::Float.id(),
        ]
    );

    let decoded: Vec<Vec<f32>> = serializer.from_bytes(&bytes).expect("deserialize");
    assert_eq!(decoded, matrix);
}

#[test]
fn test_collection_targets() {
    #[derive(Debug, Default)]
    struct Tags {
        set: BTreeSet<u16>,
        queue: VecDeque<String>,
    }

    impl PortableObject for Tags {
        fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
            let set: Vec<u16> = self.set.iter().copied().collect();
            let queue: Vec<String> = self.queue.iter().cloned().collect();
            writer.write_collection(0, &set, false)?;
            writer.write_collection(1, &queue, false)
        }

        fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
            self.set = reader.read_collection(0)?.unwrap_or_default();
            reader.read_collection_into::<String, _>(1, &mut self.queue)?;
            Ok(())
        }
    }

    pof::portable_object!(Tags);

    let mut context = context();
    context.register_type::<Tags>(100).expect("register Tags");
    let serializer = PofSerializer::new(&context);
    let tags = Tags {
        set: BTreeSet::from([3, 1, 2]),
        queue: VecDeque::from(["x".to_string(), "y".to_string()]),
    };
    let bytes = serializer.to_bytes(&tags).expect("serialize");
    let decoded: Tags = serializer.from_bytes(&bytes).expect("deserialize");
    assert_eq!(decoded.set, tags.set);
    assert_eq!(decoded.queue, tags.queue);
}

#[test]
fn test_map_of_arrays_of_objects() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let groups: HashMap<String, Vec<Circle>> = HashMap::from([
        ("small".to_string(), vec![Circle { radius: 0.1 }]),
        ("none".to_string(), Vec::new()),
        (
            "large".to_string(),
            vec![Circle { radius: 10.0 }, Circle { radius: 20.0 }],
        ),
    ]);
    let bytes = serializer.to_bytes(&groups).expect("serialize");
    let decoded: HashMap<String, Vec<Circle>> = serializer.from_bytes(&bytes).expect("deserialize");
    assert_eq!(decoded, groups);
}

#[test]
fn test_untyped_map_keeps_wire_order() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let map: std::collections::BTreeMap<u8, String> =
        (0..5u8).map(|k| (k, format!("v{k}"))).collect();
    let bytes = serializer.to_bytes(&map).expect("serialize");
    let value = serializer
        .deserialize_value(&mut bytes.as_slice())
        .expect("deserialize");
    let keys: Vec<u8> = value
        .as_map()
        .expect("map")
        .iter()
        .filter_map(|(k, _)| k.as_u8())
        .collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_read_array_type_mismatch() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let bytes = serializer.to_bytes(&vec![1i32, 2]).expect("serialize");
    assert!(matches!(
        serializer.from_bytes::<Vec<String>>(&bytes),
        Err(pof::PofError::TypeMismatch { .. })
    ));
    assert!(matches!(
        serializer.from_bytes::<HashMap<i32, i32>>(&bytes),
        Err(pof::PofError::TypeMismatch { .. })
    ));
}

#[test]
fn test_array_of_dynamic_values_round_trips() {
    let context = context();
    let serializer = PofSerializer::new(&context);
    let values = vec![PofValue::U64(u64::MAX), PofValue::Null, PofValue::from(-1i8)];
    let bytes = serializer.to_bytes(&values).expect("serialize");
    let decoded: Vec<PofValue> = serializer.from_bytes(&bytes).expect("deserialize");
    assert_eq!(decoded[0].as_u64(), Some(u64::MAX));
    assert!(decoded[1].is_null());
    assert_eq!(decoded[2].as_s8(), Some(-1));
    assert_eq!(
        decoded[0].reserved_id().map(TypeShape::reserved),
        Some(TypeShape::reserved(ReservedTypeId::U64))
    );
}
