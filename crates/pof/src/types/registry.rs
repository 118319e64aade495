// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! A [`PofContext`] maps type ids to Rust types and back, holds the
//! construction strategy of every user type, and memoizes the resolution of
//! parsed type descriptions. Registration takes `&mut self` and belongs to
//! setup; every lookup takes `&self`, so a finished context can be shared
//! across threads behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::key::TypeKey;
use super::reserved::ReservedTypeId;
use super::shape::TypeShape;
use crate::config::PofConfig;
use crate::error::{PofError, PofResult};
use crate::portable::PortableObject;

/// Zero-argument constructor of a portable object.
pub type Activator = Arc<dyn Fn() -> Box<dyn PortableObject> + Send + Sync>;

/// Activator calling `T::default()`.
#[must_use]
pub fn activator<T: PortableObject + Default>() -> Activator {
    Arc::new(|| -> Box<dyn PortableObject> { Box::new(T::default()) })
}

/// A generic type registered once under a single id.
///
/// `instantiate` maps concrete argument descriptions to the constructor of
/// the matching instantiation, or `None` when the arguments are not
/// supported.
pub trait GenericDefinition: 'static {
    const ARITY: usize;

    fn instantiate(args: &[TypeShape]) -> Option<Activator>;
}

type Instantiator = fn(&[TypeShape]) -> Option<Activator>;

#[derive(Clone)]
enum Construction {
    Object(Activator),
    Generic {
        arity: usize,
        instantiate: Instantiator,
    },
}

/// User registration.
#[derive(Clone)]
pub struct TypeEntry {
    id: i32,
    key: TypeKey,
    construction: Construction,
}

impl TypeEntry {
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self.construction, Construction::Generic { .. })
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        match self.construction {
            Construction::Object(_) => 0,
            Construction::Generic { arity, .. } => arity,
        }
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("arity", &self.arity())
            .finish()
    }
}

/// How a resolved description is decoded.
#[derive(Clone)]
pub enum Resolution {
    Reserved(ReservedTypeId),
    Object(Activator),
}

/// A type description resolved to something constructible.
pub struct ResolvedType {
    shape: TypeShape,
    resolution: Resolution,
}

impl ResolvedType {
    #[must_use]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    #[must_use]
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Fresh instance, `None` for reserved types.
    #[must_use]
    pub fn create_instance(&self) -> Option<Box<dyn PortableObject>> {
        match &self.resolution {
            Resolution::Reserved(_) => None,
            Resolution::Object(activator) => Some(activator()),
        }
    }
}

impl fmt::Debug for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedType")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Description cache hit/miss counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Type registry and description cache.
pub struct PofContext {
    reserved_by_id: HashMap<i32, ReservedTypeId>,
    reserved_by_key: HashMap<TypeKey, ReservedTypeId>,
    types_by_id: HashMap<i32, TypeEntry>,
    ids_by_key: HashMap<TypeKey, i32>,
    resolved: DashMap<TypeShape, Arc<ResolvedType>>,
    stats: Mutex<CacheStats>,
    config: PofConfig,
}

impl Default for PofContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PofContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.types_by_id.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("PofContext")
            .field("user_ids", &ids)
            .field("resolved", &self.resolved.len())
            .field("config", &self.config)
            .finish()
    }
}

impl PofContext {
    /// Registry holding only the reserved types.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PofConfig::default())
    }

    #[must_use]
    pub fn with_config(config: PofConfig) -> Self {
        let reserved_by_id = ReservedTypeId::ALL.iter().map(|r| (r.id(), *r)).collect();
        let reserved_by_key = ReservedTypeId::ALL.iter().map(|r| (r.key(), *r)).collect();
        Self {
            reserved_by_id,
            reserved_by_key,
            types_by_id: HashMap::new(),
            ids_by_key: HashMap::new(),
            resolved: DashMap::new(),
            stats: Mutex::new(CacheStats::default()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PofConfig {
        &self.config
    }

    // ===================================================================
    // Registration
    // ===================================================================

    /// Register `T` under `id`, constructed with `T::default()`.
    pub fn register_type<T: PortableObject + Default>(&mut self, id: i32) -> PofResult<()> {
        self.register_with(id, TypeKey::of::<T>(), Some(activator::<T>()))
    }

    /// Register `T` under `id`, constructed by `factory`.
    ///
    /// Re-registering the same pair keeps the first factory.
    pub fn register_factory<T, F>(&mut self, id: i32, factory: F) -> PofResult<()>
    where
        T: PortableObject,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let activator: Activator =
            Arc::new(move || -> Box<dyn PortableObject> { Box::new(factory()) });
        self.register_with(id, TypeKey::of::<T>(), Some(activator))
    }

    /// Register the generic definition `D` under `id`.
    pub fn register_generic<D: GenericDefinition>(&mut self, id: i32) -> PofResult<()> {
        self.insert(TypeEntry {
            id,
            key: TypeKey::of::<D>(),
            construction: Construction::Generic {
                arity: D::ARITY,
                instantiate: D::instantiate,
            },
        })
    }

    /// Register `key` under `id`. A type without an activator cannot be
    /// decoded and is rejected up front.
    pub fn register_with(
        &mut self,
        id: i32,
        key: TypeKey,
        activator: Option<Activator>,
    ) -> PofResult<()> {
        let activator = activator.ok_or_else(|| PofError::MissingConstructor {
            type_name: key.name().to_string(),
        })?;
        self.insert(TypeEntry {
            id,
            key,
            construction: Construction::Object(activator),
        })
    }

    /// Copy every user registration of `other` into this registry.
    ///
    /// All entries are validated before any is inserted.
    pub fn merge(&mut self, other: &PofContext) -> PofResult<()> {
        let mut incoming: Vec<&TypeEntry> = other.types_by_id.values().collect();
        incoming.sort_unstable_by_key(|entry| entry.id);

        let mut pending = Vec::with_capacity(incoming.len());
        for entry in incoming {
            if self.check(entry.id, entry.key)? {
                pending.push(entry.clone());
            }
        }
        log::debug!(
            "[pof::registry] merge: {} new entries, {} already present",
            pending.len(),
            other.types_by_id.len() - pending.len()
        );
        for entry in pending {
            self.commit(entry);
        }
        Ok(())
    }

    fn insert(&mut self, entry: TypeEntry) -> PofResult<()> {
        if self.check(entry.id, entry.key)? {
            log::debug!("[pof::registry] registered {} as pof id {}", entry.key, entry.id);
            self.commit(entry);
        }
        Ok(())
    }

    /// `Ok(false)` when the exact pair is already present.
    fn check(&self, id: i32, key: TypeKey) -> PofResult<bool> {
        if id < 0 {
            return Err(PofError::ReservedTypeId(id));
        }
        if let Some(existing) = self.types_by_id.get(&id) {
            if existing.key == key {
                return Ok(false);
            }
            return Err(PofError::DuplicateTypeId {
                id,
                existing: existing.key.name().to_string(),
                conflict: key.name().to_string(),
            });
        }
        let existing = self
            .reserved_by_key
            .get(&key)
            .map(|r| r.id())
            .or_else(|| self.ids_by_key.get(&key).copied());
        if let Some(existing) = existing {
            return Err(PofError::DuplicateType {
                type_name: key.name().to_string(),
                existing,
                conflict: id,
            });
        }
        Ok(true)
    }

    fn commit(&mut self, entry: TypeEntry) {
        self.ids_by_key.insert(entry.key, entry.id);
        self.types_by_id.insert(entry.id, entry);
    }

    // ===================================================================
    // Lookups
    // ===================================================================

    pub fn type_id_of<T: ?Sized + 'static>(&self) -> PofResult<i32> {
        self.type_id_of_key(TypeKey::of::<T>())
    }

    pub fn type_id_of_key(&self, key: TypeKey) -> PofResult<i32> {
        self.reserved_by_key
            .get(&key)
            .map(|r| r.id())
            .or_else(|| self.ids_by_key.get(&key).copied())
            .ok_or_else(|| PofError::TypeNotFound {
                type_name: key.name().to_string(),
            })
    }

    /// Type bound to `id`, `None` when the id is unknown.
    #[must_use]
    pub fn type_of_id(&self, id: i32) -> Option<TypeKey> {
        match self.reserved_by_id.get(&id) {
            Some(reserved) => Some(reserved.key()),
            None => self.types_by_id.get(&id).map(TypeEntry::key),
        }
    }

    #[must_use]
    pub fn entry(&self, id: i32) -> Option<&TypeEntry> {
        self.types_by_id.get(&id)
    }

    #[must_use]
    pub fn is_reserved_type(&self, key: TypeKey) -> bool {
        self.reserved_by_key.contains_key(&key)
    }

    #[must_use]
    pub fn is_reserved_type_id(&self, id: i32) -> bool {
        self.reserved_by_id.contains_key(&id)
    }

    /// Number of generic arguments following `id` in a description.
    #[must_use]
    pub fn arity_of(&self, id: i32) -> Option<usize> {
        match self.reserved_by_id.get(&id) {
            Some(reserved) => Some(reserved.arity()),
            None => self.types_by_id.get(&id).map(TypeEntry::arity),
        }
    }

    /// Construct a registered, non-generic user type.
    pub fn create_instance(&self, key: TypeKey) -> PofResult<Box<dyn PortableObject>> {
        let entry = self
            .ids_by_key
            .get(&key)
            .and_then(|id| self.types_by_id.get(id))
            .ok_or_else(|| PofError::TypeNotFound {
                type_name: key.name().to_string(),
            })?;
        match &entry.construction {
            Construction::Object(activator) => Ok(activator()),
            Construction::Generic { .. } => Err(PofError::MissingConstructor {
                type_name: format!("{} (generic definition without arguments)", key.name()),
            }),
        }
    }

    /// Description of the non-generic type `T`.
    pub fn shape_of<T: ?Sized + 'static>(&self) -> PofResult<TypeShape> {
        self.shape_of_key(TypeKey::of::<T>())
    }

    pub fn shape_of_key(&self, key: TypeKey) -> PofResult<TypeShape> {
        let id = self.type_id_of_key(key)?;
        match self.types_by_id.get(&id) {
            Some(entry) if entry.is_generic() => Err(PofError::mismatch(
                "non-generic type",
                format!("generic definition {key}"),
            )),
            _ => Ok(TypeShape::Leaf(id)),
        }
    }

    /// Description of the generic definition `D` applied to `args`.
    pub fn generic_shape<D: GenericDefinition>(&self, args: Vec<TypeShape>) -> PofResult<TypeShape> {
        let head = self.type_id_of::<D>()?;
        if args.len() != D::ARITY {
            return Err(PofError::mismatch(
                format!("{} type arguments", D::ARITY),
                format!("{} type arguments", args.len()),
            ));
        }
        Ok(TypeShape::Generic { head, args })
    }

    // ===================================================================
    // Description resolution (memoized)
    // ===================================================================

    /// Resolve a parsed description to a constructible type.
    ///
    /// Results are cached by structural equality of the description.
    /// Concurrent misses may build the same entry twice; the first insert
    /// wins.
    pub fn resolve(&self, shape: &TypeShape) -> PofResult<Arc<ResolvedType>> {
        let hit = self.resolved.get(shape).map(|r| Arc::clone(r.value()));
        if let Some(hit) = hit {
            self.stats.lock().hits += 1;
            return Ok(hit);
        }
        self.stats.lock().misses += 1;

        let built = Arc::new(self.build_resolved(shape)?);
        log::trace!("[pof::registry] resolved {shape}");
        let entry = self.resolved.entry(shape.clone()).or_insert(built);
        Ok(Arc::clone(entry.value()))
    }

    fn build_resolved(&self, shape: &TypeShape) -> PofResult<ResolvedType> {
        let head = shape.head();
        if let Some(reserved) = self.reserved_by_id.get(&head) {
            return Ok(ResolvedType {
                shape: shape.clone(),
                resolution: Resolution::Reserved(*reserved),
            });
        }
        let entry = self
            .types_by_id
            .get(&head)
            .ok_or(PofError::TypeIdNotFound(head))?;
        let activator = match (&entry.construction, shape) {
            (Construction::Object(activator), TypeShape::Leaf(_)) => Arc::clone(activator),
            (Construction::Generic { arity, instantiate }, TypeShape::Generic { args, .. })
                if args.len() == *arity =>
            {
                for arg in args {
                    self.resolve(arg)?;
                }
                instantiate(args).ok_or_else(|| PofError::MissingConstructor {
                    type_name: format!("{} as {shape}", entry.key),
                })?
            }
            _ => {
                return Err(PofError::mismatch(
                    format!("{} with {} type arguments", entry.key, entry.arity()),
                    shape.to_string(),
                ))
            }
        };
        Ok(ResolvedType {
            shape: shape.clone(),
            resolution: Resolution::Object(activator),
        })
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    #[must_use]
    pub fn cached_descriptions(&self) -> usize {
        self.resolved.len()
    }
}
