// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use pof::ser::cursor::ByteCursor;
use pof::{PofContext, TypeShape};

fuzz_target!(|data: &[u8]| {
    let context = PofContext::new();
    let mut cursor = ByteCursor::new(data.to_vec().into());

    // Parsed descriptions must flatten back to the ids they consumed
    if let Ok(shape) = TypeShape::parse(&mut cursor, &context) {
        let mut written = Vec::new();
        if shape.write_to(&mut written).is_ok() {
            assert_eq!(&written[..], &data[..cursor.offset()]);
        }
    }
});
