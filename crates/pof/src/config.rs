// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode limits.
//!
//! Every length, count and nesting level read from the wire is checked
//! against these bounds before anything is allocated.

// =======================================================================
// Defaults
// =======================================================================

/// Maximum nesting of type descriptions and object frames.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum byte length of a length-prefixed envelope (64 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Maximum number of slots in one frame.
pub const DEFAULT_MAX_SLOT_COUNT: usize = 65_536;

/// Maximum element count of one array or map.
pub const DEFAULT_MAX_ELEMENTS: usize = 16 * 1024 * 1024;

/// Limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PofConfig {
    pub max_depth: usize,
    pub max_frame_len: usize,
    pub max_slot_count: usize,
    pub max_elements: usize,
}

impl Default for PofConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            max_slot_count: DEFAULT_MAX_SLOT_COUNT,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl PofConfig {
    /// Defaults overridden by `POF_MAX_DEPTH`, `POF_MAX_FRAME_LEN`,
    /// `POF_MAX_SLOT_COUNT` and `POF_MAX_ELEMENTS` when set.
    ///
    /// Unparsable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_depth: env_usize("POF_MAX_DEPTH").unwrap_or(defaults.max_depth),
            max_frame_len: env_usize("POF_MAX_FRAME_LEN").unwrap_or(defaults.max_frame_len),
            max_slot_count: env_usize("POF_MAX_SLOT_COUNT").unwrap_or(defaults.max_slot_count),
            max_elements: env_usize("POF_MAX_ELEMENTS").unwrap_or(defaults.max_elements),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    #[must_use]
    pub fn with_max_slot_count(mut self, max_slot_count: usize) -> Self {
        self.max_slot_count = max_slot_count;
        self
    }

    #[must_use]
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
