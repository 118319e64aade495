// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slot frames.
//!
//! A frame is an ordered set of independently sized byte ranges addressed
//! by index:
//!
//! ```text
//! [slot_count:i32][len_0:i32]..[len_n-1:i32][bytes_0]..[bytes_n-1]
//! ```

mod destination;
mod source;

pub use destination::SlotDestination;
pub use source::SlotSource;
