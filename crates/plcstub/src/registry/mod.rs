// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The tag registry: a concurrency-safe ordered index from id to tag node.
//!
//! Two lock tiers: one reader-writer lock over the structural index, one
//! mutex per node (see [`TagNode`]). Structural operations (insert, remove,
//! directory regeneration) take the structural lock exclusively; ordinary
//! lookups take it shared and release it before returning. Returned handles
//! are `Arc`s, so a handle outlives a concurrent remove safely.
//!
//! Id 1 is permanently reserved for the `@tags` metatag, a synthetic node
//! whose buffer is a binary directory of every other tag (see [`metatag`]).

pub mod metatag;

pub use metatag::DirectoryEntry;

use crate::error::{Error, Result};
use crate::tag::{alloc_zeroed, TagNode, WORD_BYTES};
use crate::types::{ScalarKind, TypeDescriptor};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reserved id of the `@tags` directory node. Never assigned to a user tag.
pub const METATAG_ID: u32 = 1;

/// Name of the directory node. Inserting under this name regenerates the
/// directory instead of creating a tag.
pub const METATAG_NAME: &str = "@tags";

/// Number of demo tags populated at construction.
const SEED_COUNT: u32 = 10;

type TagIndex = BTreeMap<u32, Arc<TagNode>>;

/// The tag registry.
///
/// An explicit value with defined construction: create one with
/// [`Registry::new`] and pass it (or an `Arc` of it) to consumers. All state
/// is process-lifetime; nothing is persisted.
pub struct Registry {
    tags: RwLock<TagIndex>,
}

impl Registry {
    /// Create a registry pre-populated with the demo seed tags.
    ///
    /// Seeding happens here, exactly once, rather than lazily on first use.
    pub fn new() -> Result<Self> {
        let registry = Self {
            tags: RwLock::new(BTreeMap::new()),
        };
        registry.seed()?;
        Ok(registry)
    }

    /// Create an empty registry with no seed tags.
    pub fn empty() -> Self {
        Self {
            tags: RwLock::new(BTreeMap::new()),
        }
    }

    fn seed(&self) -> Result<()> {
        let mut tags = self.tags.write();
        for i in 0..SEED_COUNT {
            let id = next_id(&tags);
            let ty = TypeDescriptor::scalar(ScalarKind::Dint);
            let mut data = alloc_zeroed(ty.size_bytes().max(WORD_BYTES))?;
            data[..4].copy_from_slice(&i.to_le_bytes());
            let node = TagNode::with_data(id, format!("DUMMY_AQUA_DATA_{}", i), ty, data);
            tags.insert(id, Arc::new(node));
        }
        log::debug!("[Registry] Seeded {} demo tags", SEED_COUNT);
        Ok(())
    }

    /// Insert a new tag and return its id.
    ///
    /// Ids are assigned monotonically (`max existing id + 1`) and never
    /// collide with the reserved directory id. The node becomes visible only
    /// fully formed; any cached directory is invalidated in the same critical
    /// section. Inserting under the name `"@tags"` regenerates the directory
    /// and returns [`METATAG_ID`].
    ///
    /// Duplicate names are not rejected; two tags may share a name and differ
    /// only by id.
    pub fn insert(&self, name: &str, ty: TypeDescriptor) -> Result<u32> {
        if name.is_empty() {
            return Err(Error::BadParam("tag name must not be empty".into()));
        }
        if ty.is_error() {
            return Err(Error::BadParam("tag type is the ERROR descriptor".into()));
        }

        let mut tags = self.tags.write();

        if name == METATAG_NAME {
            metatag::rebuild(&mut tags)?;
            return Ok(METATAG_ID);
        }

        let id = next_id(&tags);
        let node = TagNode::new(id, name, ty)?;
        tags.insert(id, Arc::new(node));

        // Invalidate the cached directory; the next lookup of METATAG_ID
        // rebuilds it from current state.
        tags.remove(&METATAG_ID);

        log::debug!("[Registry] Created tag {} ({})", id, name);
        Ok(id)
    }

    /// Look up a tag by id.
    ///
    /// For ordinary ids this takes the structural lock shared, just long
    /// enough to clone the handle; the node itself is not locked. For
    /// [`METATAG_ID`] the lock is taken exclusively so a missing directory
    /// can be synthesized under the same lock.
    pub fn lookup(&self, id: u32) -> Result<Arc<TagNode>> {
        if id == METATAG_ID {
            let mut tags = self.tags.write();
            if let Some(node) = tags.get(&METATAG_ID) {
                return Ok(node.clone());
            }
            return metatag::rebuild(&mut tags);
        }

        let tags = self.tags.read();
        tags.get(&id).cloned().ok_or(Error::NotFound(id))
    }

    /// Remove a tag by id.
    ///
    /// The node is detached under the exclusive lock; its resources are
    /// released after the lock is dropped, so long-running destruction never
    /// blocks other registry operations. Removing [`METATAG_ID`] is always a
    /// successful no-op.
    pub fn remove(&self, id: u32) -> Result<()> {
        if id == METATAG_ID {
            return Ok(());
        }

        let detached = {
            let mut tags = self.tags.write();
            let node = tags.remove(&id).ok_or(Error::NotFound(id))?;
            // A stale directory would still list the removed tag.
            tags.remove(&METATAG_ID);
            node
        };

        log::debug!("[Registry] Removed tag {}", id);
        drop(detached);
        Ok(())
    }

    /// Number of live tags, including the cached directory if present.
    pub fn len(&self) -> usize {
        self.tags.read().len()
    }

    /// True when no tags are live.
    pub fn is_empty(&self) -> bool {
        self.tags.read().is_empty()
    }

    /// Snapshot of all live nodes in ascending id order.
    pub fn snapshot(&self) -> Vec<Arc<TagNode>> {
        self.tags.read().values().cloned().collect()
    }
}

/// Next free id: one past the current maximum, starting just above the
/// reserved directory id.
fn next_id(tags: &TagIndex) -> u32 {
    tags.keys().next_back().map_or(METATAG_ID + 1, |max| max + 1)
}
