// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # plcstub - simulated PLC tag memory
//!
//! An in-memory stand-in for an industrial tag-access API: client software
//! can exercise its read/write/enumerate logic against simulated controller
//! memory without real hardware on the bench.
//!
//! ## Quick Start
//!
//! ```rust
//! use plcstub::{PlcStub, Result, ScalarKind, TypeDescriptor, METATAG_ID};
//!
//! fn main() -> Result<()> {
//!     let stub = PlcStub::new()?;
//!
//!     // Create a tag and poke at it
//!     let id = stub.registry().insert("PUMP_SPEED", TypeDescriptor::scalar(ScalarKind::Dint))?;
//!     stub.set_i32(id, 0, 1750)?;
//!     assert_eq!(stub.get_i32(id, 0)?, 1750);
//!
//!     // Enumerate everything through the @tags directory
//!     let directory = stub.registry().lookup(METATAG_ID)?;
//!     let entries = plcstub::DirectoryEntry::parse_all(&directory.lock().data)?;
//!     assert!(entries.iter().any(|e| e.name == "PUMP_SPEED"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                     Client / test harness                    |
//! +--------------------------------------------------------------+
//! |  PlcStub facade                                              |
//! |  attribute-string create | typed get/set | event callbacks   |
//! +--------------------------------------------------------------+
//! |  Registry (structural RwLock)                                |
//! |  id -> Arc<TagNode> index | monotonic ids | @tags directory  |
//! +--------------------------------------------------------------+
//! |  TagNode (per-node Mutex)      TypeDescriptor                |
//! |  buffer + callback             scalar / array / struct       |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Registry`] | Concurrency-safe ordered collection of tag nodes |
//! | [`TagNode`] | One named, typed, live buffer |
//! | [`TypeDescriptor`] | Recursive scalar/array/struct type representation |
//! | [`PlcStub`] | Client facade: typed accessors and lifecycle callbacks |
//! | [`DirectoryEntry`] | Decoded entry of the `@tags` directory blob |
//!
//! Nothing here talks to a device or touches disk; all state lives in
//! process memory and is discarded at exit. Logging goes through the `log`
//! facade; install any backend to see it.

/// Error and result types.
pub mod error;
/// Tag registry: the ordered id index and the `@tags` directory cache.
pub mod registry;
/// Little-endian cursors for the directory wire format.
pub mod ser;
/// Client facade: typed accessors, creation attributes, callbacks.
pub mod stub;
/// Tag nodes and their per-node state.
pub mod tag;
/// Recursive type descriptors.
pub mod types;

pub use error::{Error, Result};
pub use registry::{DirectoryEntry, Registry, METATAG_ID, METATAG_NAME};
pub use stub::PlcStub;
pub use tag::{TagCallback, TagEvent, TagNode, TagState, WORD_BYTES};
pub use types::{Field, ScalarKind, TypeDescriptor};

/// plcstub version string.
pub const VERSION: &str = "0.3.1";
