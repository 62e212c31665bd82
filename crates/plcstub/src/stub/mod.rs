// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The client-facing tag API: typed accessors over registry buffers.
//!
//! [`PlcStub`] mirrors the shape of the libplctag surface a client exercises:
//! attribute-string creation, no-op read/write cycles that fire lifecycle
//! callbacks, and per-width getters/setters that translate a field offset
//! into a read or write against a tag's buffer.
//!
//! Offset semantics: for array-typed tags the offset is an element index,
//! scaled by the element size; for every other type only offset 0 is valid.
//! Timeouts are accepted for API compatibility and not enforced.

mod attr;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::tag::{TagCallback, TagEvent, TagState};
use crate::types::{ScalarKind, TypeDescriptor};
use std::sync::Arc;

/// Generate a little-endian getter/setter pair for one field width.
macro_rules! impl_typed_accessors {
    ($get:ident, $set:ident, $ty:ty, $size:expr) => {
        pub fn $get(&self, id: u32, offset: usize) -> Result<$ty> {
            let bytes = self.read_field::<$size>(id, offset)?;
            Ok(<$ty>::from_le_bytes(bytes))
        }

        pub fn $set(&self, id: u32, offset: usize, value: $ty) -> Result<()> {
            self.write_field::<$size>(id, offset, value.to_le_bytes())
        }
    };
}

/// Thin client handle over a shared [`Registry`].
#[derive(Clone)]
pub struct PlcStub {
    registry: Arc<Registry>,
}

impl PlcStub {
    /// Create a stub over a freshly seeded registry.
    pub fn new() -> Result<Self> {
        Ok(Self {
            registry: Arc::new(Registry::new()?),
        })
    }

    /// Create a stub over an existing registry.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Create a tag from a `key=value&...` attribute string and return its id.
    ///
    /// Tags created this way are `LINT` scalars; `elem_size`/`elem_count`
    /// attributes are discarded. The timeout is accepted and ignored.
    pub fn create(&self, attrs: &str, _timeout_ms: i32) -> Result<u32> {
        let request = attr::parse(attrs)?;
        self.registry
            .insert(&request.name, TypeDescriptor::scalar(ScalarKind::Lint))
    }

    /// Destroy a tag. Destroying the reserved directory id is a no-op.
    pub fn destroy(&self, id: u32) -> Result<()> {
        self.registry.remove(id)
    }

    /// Tag status; the stub has no in-flight operations, so a live tag is
    /// always Ok.
    pub fn status(&self, id: u32) -> Result<()> {
        self.registry.lookup(id).map(|_| ())
    }

    /// Buffer size of a tag in bytes.
    pub fn size(&self, id: u32) -> Result<usize> {
        Ok(self.registry.lookup(id)?.size())
    }

    /// Stubbed read cycle: validates arguments and fires the read callbacks.
    pub fn read(&self, id: u32, timeout_ms: i32) -> Result<()> {
        self.cycle(id, timeout_ms, TagEvent::ReadStarted, TagEvent::ReadCompleted)
    }

    /// Stubbed write cycle: validates arguments and fires the write callbacks.
    pub fn write(&self, id: u32, timeout_ms: i32) -> Result<()> {
        self.cycle(id, timeout_ms, TagEvent::WriteStarted, TagEvent::WriteCompleted)
    }

    fn cycle(&self, id: u32, timeout_ms: i32, start: TagEvent, done: TagEvent) -> Result<()> {
        if timeout_ms < 0 {
            log::warn!("[Stub] Timeout must not be negative");
            return Err(Error::BadParam("timeout must not be negative".into()));
        }
        let node = self.registry.lookup(id)?;
        let state = node.lock();
        fire(&state, id, start, None);
        fire(&state, id, done, None);
        Ok(())
    }

    /// Register an event callback on a tag, replacing any existing one.
    pub fn register_callback(&self, id: u32, callback: TagCallback) -> Result<()> {
        let node = self.registry.lookup(id)?;
        node.lock().callback = Some(callback);
        Ok(())
    }

    /// Remove a tag's event callback.
    pub fn unregister_callback(&self, id: u32) -> Result<()> {
        let node = self.registry.lookup(id)?;
        node.lock().callback = None;
        Ok(())
    }

    impl_typed_accessors!(get_u8, set_u8, u8, 1);
    impl_typed_accessors!(get_i8, set_i8, i8, 1);
    impl_typed_accessors!(get_u16, set_u16, u16, 2);
    impl_typed_accessors!(get_i16, set_i16, i16, 2);
    impl_typed_accessors!(get_u32, set_u32, u32, 4);
    impl_typed_accessors!(get_i32, set_i32, i32, 4);
    impl_typed_accessors!(get_u64, set_u64, u64, 8);
    impl_typed_accessors!(get_i64, set_i64, i64, 8);
    impl_typed_accessors!(get_f32, set_f32, f32, 4);
    impl_typed_accessors!(get_f64, set_f64, f64, 8);

    /// Bit accessors mirror the classic API: the bit occupies a whole
    /// 32-bit field holding zero or one.
    pub fn get_bit(&self, id: u32, offset: usize) -> Result<bool> {
        Ok(self.get_i32(id, offset)? != 0)
    }

    pub fn set_bit(&self, id: u32, offset: usize, value: bool) -> Result<()> {
        self.set_i32(id, offset, i32::from(value))
    }

    fn read_field<const N: usize>(&self, id: u32, offset: usize) -> Result<[u8; N]> {
        let node = self.lookup_logged(id)?;
        let state = node.lock();
        fire(&state, id, TagEvent::ReadStarted, None);

        let byte = match resolve_offset(node.ty(), offset, N, state.data.len()) {
            Ok(byte) => byte,
            Err(violation) => return Err(violation.reject(&state, id)),
        };

        let mut out = [0u8; N];
        out.copy_from_slice(&state.data[byte..byte + N]);
        log::debug!("[Stub] Read {} bytes from tag {} at offset {}", N, id, offset);

        fire(&state, id, TagEvent::ReadCompleted, None);
        Ok(out)
    }

    fn write_field<const N: usize>(&self, id: u32, offset: usize, value: [u8; N]) -> Result<()> {
        let node = self.lookup_logged(id)?;
        let mut state = node.lock();
        fire(&state, id, TagEvent::WriteStarted, None);

        let byte = match resolve_offset(node.ty(), offset, N, state.data.len()) {
            Ok(byte) => byte,
            Err(violation) => return Err(violation.reject(&state, id)),
        };

        state.data[byte..byte + N].copy_from_slice(&value);
        log::debug!("[Stub] Wrote {} bytes to tag {} at offset {}", N, id, offset);

        fire(&state, id, TagEvent::WriteCompleted, None);
        Ok(())
    }

    fn lookup_logged(&self, id: u32) -> Result<Arc<crate::tag::TagNode>> {
        self.registry.lookup(id).map_err(|e| {
            log::warn!("[Stub] Unknown tag {}", id);
            e
        })
    }
}

/// An offset the tag's type does not admit.
struct OffsetViolation {
    message: String,
    /// The non-array misuse path also notifies the tag's callback.
    abort_event: bool,
}

impl OffsetViolation {
    fn reject(self, state: &TagState, id: u32) -> Error {
        log::warn!("[Stub] Tag {}: {}", id, self.message);
        let err = Error::BadParam(self.message);
        if self.abort_event {
            fire(state, id, TagEvent::Aborted, Some(err.clone()));
        }
        err
    }
}

/// Translate a caller offset into a byte offset, enforcing the type's shape
/// and the buffer bounds.
fn resolve_offset(
    ty: &TypeDescriptor,
    offset: usize,
    width: usize,
    data_len: usize,
) -> std::result::Result<usize, OffsetViolation> {
    let byte = if let Some(len) = ty.array_len() {
        if offset >= usize::from(len) {
            return Err(OffsetViolation {
                message: format!("offset {} not in [0, {})", offset, len),
                abort_event: false,
            });
        }
        offset * ty.element_size()
    } else {
        if offset > 0 {
            return Err(OffsetViolation {
                message: format!("offset {} specified for non-array type {}", offset, ty.name()),
                abort_event: true,
            });
        }
        0
    };

    if byte + width > data_len {
        return Err(OffsetViolation {
            message: format!(
                "field of {} bytes at byte offset {} exceeds buffer of {}",
                width, byte, data_len
            ),
            abort_event: false,
        });
    }
    Ok(byte)
}

fn fire(state: &TagState, id: u32, event: TagEvent, error: Option<Error>) {
    if let Some(callback) = &state.callback {
        log::debug!("[Stub] Calling callback for tag {} with {:?}", id, event);
        callback(id, event, error);
    }
}
