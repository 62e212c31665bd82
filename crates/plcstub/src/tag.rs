// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag nodes: one named, typed, live buffer each.
//!
//! The registry's structural lock protects the id index; each node carries
//! its own mutex guarding the buffer and the registered callback. Handles are
//! `Arc`s, so a node handed out by a lookup stays valid even if a concurrent
//! remove detaches it from the index.

use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Machine-word floor for tag buffers. Every buffer is at least this large so
/// fixed-width scalar accessors never have to special-case tiny payloads.
pub const WORD_BYTES: usize = std::mem::size_of::<usize>();

/// Lifecycle events delivered to a registered tag callback.
///
/// The registry only stores callbacks; the accessor facade fires them around
/// read/write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEvent {
    ReadStarted,
    ReadCompleted,
    WriteStarted,
    WriteCompleted,
    Aborted,
}

/// Event sink registered on a tag. Receives the tag id, the event, and the
/// error that aborted the operation (`None` on the success paths).
pub type TagCallback = Arc<dyn Fn(u32, TagEvent, Option<Error>) + Send + Sync>;

/// Mutable per-tag state, guarded by the node mutex.
pub struct TagState {
    /// Raw payload bytes. Fixed capacity for the node's lifetime.
    pub data: Vec<u8>,
    /// Registered event sink, if any.
    pub callback: Option<TagCallback>,
}

/// One named, typed, addressable in-memory buffer.
pub struct TagNode {
    id: u32,
    name: String,
    ty: TypeDescriptor,
    state: Mutex<TagState>,
}

impl TagNode {
    /// Create a node with a zeroed buffer sized to its type (word floor
    /// applied). Allocation failure is reported, not fatal.
    pub fn new(id: u32, name: impl Into<String>, ty: TypeDescriptor) -> Result<Self> {
        let data = alloc_zeroed(ty.size_bytes().max(WORD_BYTES))?;
        Ok(Self::with_data(id, name, ty, data))
    }

    /// Create a node around an existing buffer (seed payloads, directory blob).
    pub(crate) fn with_data(
        id: u32,
        name: impl Into<String>,
        ty: TypeDescriptor,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            state: Mutex::new(TagState {
                data,
                callback: None,
            }),
        }
    }

    /// The node's registry id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The node's name. Names are not unique across the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's type, fixed for its lifetime.
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Acquire the node lock, granting access to buffer and callback.
    pub fn lock(&self) -> MutexGuard<'_, TagState> {
        self.state.lock()
    }

    /// Buffer length in bytes (never changes after creation).
    pub fn size(&self) -> usize {
        self.state.lock().data.len()
    }
}

impl std::fmt::Debug for TagNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("size", &self.size())
            .finish()
    }
}

/// Allocate a zeroed buffer, surfacing allocation failure as `OutOfMemory`.
pub(crate) fn alloc_zeroed(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
    data.resize(len, 0);
    Ok(data)
}
