// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every codec layer.

use std::io;
use thiserror::Error;

/// Result alias used across the crate.
pub type PofResult<T> = Result<T, PofError>;

/// Errors raised while registering, writing or reading portable objects.
///
/// No variant is recoverable inside the codec: a failure aborts the current
/// serialize or deserialize call and is returned to its caller.
#[derive(Debug, Error)]
pub enum PofError {
    // ========================================================================
    // Configuration errors (registration)
    // ========================================================================
    /// Negative ids belong to the reserved range.
    #[error("pof id {0} is out of range: negative ids are reserved")]
    ReservedTypeId(i32),

    #[error("cannot reserve pof id {id} to {conflict} as it is already assigned to {existing}")]
    DuplicateTypeId {
        id: i32,
        existing: String,
        conflict: String,
    },

    #[error("{type_name} is already registered as pof id {existing}, cannot register it as {conflict}")]
    DuplicateType {
        type_name: String,
        existing: i32,
        conflict: i32,
    },

    #[error("no constructor available for {type_name}")]
    MissingConstructor { type_name: String },

    // ========================================================================
    // Lookup errors
    // ========================================================================
    #[error("type {type_name} is not registered")]
    TypeNotFound { type_name: String },

    #[error("pof id {0} is not registered")]
    TypeIdNotFound(i32),

    // ========================================================================
    // Structural mismatch
    // ========================================================================
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    // ========================================================================
    // Usage errors (slot frames)
    // ========================================================================
    #[error("slot {0} has already been written")]
    SlotAlreadySet(usize),

    #[error("slot {slot} is out of range (frame has {count} slots)")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("slot {missing} is missing, frame slots must be dense (0..{count})")]
    SlotGap { missing: usize, count: usize },

    // ========================================================================
    // Malformed input
    // ========================================================================
    #[error("read failed at offset {offset}: {reason}")]
    ReadFailed { offset: usize, reason: &'static str },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("{what} limit exceeded (max {limit})")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of [`PofError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Lookup,
    Usage,
    StructuralMismatch,
    Malformed,
    Io,
}

impl PofError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReservedTypeId(_)
            | Self::DuplicateTypeId { .. }
            | Self::DuplicateType { .. }
            | Self::MissingConstructor { .. } => ErrorKind::Configuration,
            Self::TypeNotFound { .. } | Self::TypeIdNotFound(_) => ErrorKind::Lookup,
            Self::SlotAlreadySet(_) | Self::SlotOutOfRange { .. } | Self::SlotGap { .. } => {
                ErrorKind::Usage
            }
            Self::TypeMismatch { .. } => ErrorKind::StructuralMismatch,
            Self::ReadFailed { .. }
            | Self::InvalidData(_)
            | Self::LimitExceeded { .. }
            | Self::Unsupported(_) => ErrorKind::Malformed,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
