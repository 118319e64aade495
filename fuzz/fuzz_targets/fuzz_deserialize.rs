// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use pof::{PofContext, PofReader, PofResult, PofSerializer, PofWriter, PortableObject, SerializationFlags};

#[derive(Debug, Default)]
struct Record {
    name: Option<String>,
    values: Vec<i64>,
    children: Vec<Record>,
}

impl PortableObject for Record {
    fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
        writer.write_object(0, &self.name)?;
        writer.write_collection(1, &self.values, false)?;
        writer.write_collection(2, &self.children, false)
    }

    fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
        self.name = reader.read_object(0)?;
        self.values = reader.read_array(1)?.unwrap_or_default();
        self.children = reader.read_array(2)?.unwrap_or_default();
        Ok(())
    }
}

pof::portable_object!(Record);

fn context() -> &'static PofContext {
    static CONTEXT: OnceLock<PofContext> = OnceLock::new();
    CONTEXT.get_or_init(|| {
        let mut context = PofContext::new();
        let _ = context.register_type::<Record>(1);
        context
    })
}

fuzz_target!(|data: &[u8]| {
    let serializer = PofSerializer::new(context());

    // Untyped decode of arbitrary input
    let _ = serializer.deserialize_value(&mut &data[..]);

    // Typed decode, with and without envelope options
    let _ = serializer.from_bytes::<Record>(data);
    let _ = serializer.deserialize_with::<Record, _>(&mut &data[..], SerializationFlags::LENGTHLESS);
    let _ = serializer.deserialize_with::<Vec<String>, _>(&mut &data[..], SerializationFlags::TYPELESS);
});
