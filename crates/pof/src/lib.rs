// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Portable Object Format
//!
//! Self-describing binary serialization of object graphs:
//! - Values are written into indexed slots of a length-prefixed frame
//! - Every object slot starts with a pre-order list of `int32` type ids
//! - Generic types, arrays and maps are described structurally
//! - Monomorphic collections skip per-element type ids
//!
//! # Quick Start
//!
//! ```
//! use pof::{PofContext, PofReader, PofResult, PofSerializer, PofWriter, PortableObject};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Account {
//!     owner: String,
//!     balance: i64,
//! }
//!
//! impl PortableObject for Account {
//!     fn serialize(&self, writer: &mut PofWriter<'_>) -> PofResult<()> {
//!         writer.write_string(0, &self.owner)?;
//!         writer.write_s64(1, self.balance)
//!     }
//!
//!     fn deserialize(&mut self, reader: &PofReader<'_>) -> PofResult<()> {
//!         self.owner = reader.read_string(0)?;
//!         self.balance = reader.read_s64(1)?;
//!         Ok(())
//!     }
//! }
//!
//! pof::portable_object!(Account);
//!
//! let mut context = PofContext::new();
//! context.register_type::<Account>(1)?;
//!
//! let serializer = PofSerializer::new(&context);
//! let account = Account { owner: "ada".into(), balance: 42 };
//! let bytes = serializer.to_bytes(&account)?;
//! let decoded: Account = serializer.from_bytes(&bytes)?;
//! assert_eq!(decoded, account);
//! # Ok::<(), pof::PofError>(())
//! ```
//!
//! # Wire Summary
//!
//! | Element | Layout |
//! |---------|--------|
//! | Envelope | `[i32 len][frame]` |
//! | Frame | `[i32 count][i32 len x count][slot bytes]` |
//! | Object slot | `[type ids][payload]` |
//! | Integers, floats | fixed-width little-endian |
//! | String | UTF-8, zero terminated |

pub mod config;
pub mod error;
pub mod portable;
pub mod reader;
pub mod ser;
pub mod serializer;
pub mod slot;
pub mod types;
pub mod value;
pub mod wrappers;
pub mod writer;

pub use config::PofConfig;
pub use error::{ErrorKind, PofError, PofResult};
pub use portable::{AsAny, Portable, PortableObject};
pub use reader::PofReader;
pub use serializer::{PofSerializer, SerializationFlags};
pub use slot::{SlotDestination, SlotSource};
pub use types::{
    activator, Activator, CacheStats, GenericDefinition, PofContext, ReservedTypeId, TypeKey,
    TypeShape,
};
pub use value::PofValue;
pub use wrappers::{Declared, PortableArray, PortableMap};
pub use writer::PofWriter;
