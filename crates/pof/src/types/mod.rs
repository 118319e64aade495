// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type identity, reserved ids, descriptions and the registry.

mod key;
mod reserved;
mod shape;

pub mod registry;

pub use key::TypeKey;
pub use registry::{
    activator, Activator, CacheStats, GenericDefinition, PofContext, Resolution, ResolvedType,
    TypeEntry,
};
pub use reserved::{markers, ReservedTypeId};
pub use shape::TypeShape;
