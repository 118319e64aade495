// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level reading and primitive encodings.

pub mod cursor;
pub mod primitives;
