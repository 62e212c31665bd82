// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `@tags` directory encoding.
//!
//! The directory is a synthetic tag (id 1) whose buffer concatenates one
//! entry per live tag, letting a client enumerate the registry without
//! knowing any ids up front. Per-entry layout, packed little-endian:
//!
//! | field      | bytes | value                                  |
//! |------------|-------|----------------------------------------|
//! | id         | 4     | tag id                                 |
//! | type code  | 2     | always `1 << 13`                       |
//! | elem size  | 2     | size in bytes of one element           |
//! | dims\[0\]  | 4     | array length for arrays, else 0        |
//! | dims\[1\]  | 4     | always 0 (one dimension only)          |
//! | dims\[2\]  | 4     | always 0                               |
//! | name len   | 2     | raw name byte count                    |
//! | name       | n     | raw bytes, no NUL terminator           |
//!
//! The blob is recomputed wholesale, never patched in place: readers either
//! see the complete previous directory or the complete next one.

use crate::error::Result;
use crate::ser::{Cursor, CursorMut};
use crate::tag::{alloc_zeroed, TagNode};
use crate::types::{ScalarKind, TypeDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{METATAG_ID, METATAG_NAME};

/// Fixed bytes per entry ahead of the name.
pub const ENTRY_HEADER_BYTES: usize = 22;

/// The fixed bit pattern emitted in every entry's type-code field. The
/// directory does not encode the real scalar/array/struct type.
pub const TYPE_CODE: u16 = 1 << 13;

/// Regenerate the directory node from the current index and install it.
///
/// Caller must hold the registry's structural lock exclusively. Any stale
/// directory is dropped first; the directory never lists itself.
pub(crate) fn rebuild(tags: &mut BTreeMap<u32, Arc<TagNode>>) -> Result<Arc<TagNode>> {
    tags.remove(&METATAG_ID);

    // First pass: exact total size.
    let total: usize = tags
        .values()
        .map(|node| ENTRY_HEADER_BYTES + node.name().len())
        .sum();

    // Second pass: one entry per node, ascending id order.
    let mut blob = alloc_zeroed(total)?;
    let mut cursor = CursorMut::new(&mut blob);
    for node in tags.values() {
        let ty = node.ty();
        cursor.write_u32_le(node.id())?;
        cursor.write_u16_le(TYPE_CODE)?;
        cursor.write_u16_le(ty.element_size() as u16)?;
        cursor.write_u32_le(u32::from(ty.array_len().unwrap_or(0)))?;
        cursor.write_u32_le(0)?;
        cursor.write_u32_le(0)?;
        cursor.write_u16_le(node.name().len() as u16)?;
        cursor.write_bytes(node.name().as_bytes())?;
    }
    debug_assert_eq!(cursor.remaining(), 0, "sizing pass disagrees with writer");

    log::debug!(
        "[Registry] Rebuilt {} directory ({} entries, {} bytes)",
        METATAG_NAME,
        tags.len(),
        total
    );

    // The blob is opaque to the type system; the advisory descriptor is a
    // byte array so element-indexed reads over the directory work. Only the
    // descriptor saturates for oversized directories, never the blob.
    let ty = TypeDescriptor::array(
        blob.len().min(usize::from(u16::MAX)) as u16,
        TypeDescriptor::scalar(ScalarKind::Sint),
    );
    let node = Arc::new(TagNode::with_data(METATAG_ID, METATAG_NAME, ty, blob));
    tags.insert(METATAG_ID, node.clone());
    Ok(node)
}

/// One decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Tag id.
    pub id: u32,
    /// Raw type-code field (the fixed pattern, see [`TYPE_CODE`]).
    pub type_code: u16,
    /// Size in bytes of one element.
    pub elem_size: u16,
    /// Array dimensions; only `dims[0]` is ever non-zero.
    pub dims: [u32; 3],
    /// Tag name.
    pub name: String,
}

impl DirectoryEntry {
    /// Decode every entry in a directory blob.
    pub fn parse_all(blob: &[u8]) -> Result<Vec<DirectoryEntry>> {
        let mut cursor = Cursor::new(blob);
        let mut entries = Vec::new();
        while !cursor.is_eof() {
            entries.push(Self::parse(&mut cursor)?);
        }
        Ok(entries)
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let id = cursor.read_u32_le()?;
        let type_code = cursor.read_u16_le()?;
        let elem_size = cursor.read_u16_le()?;
        let dims = [
            cursor.read_u32_le()?,
            cursor.read_u32_le()?,
            cursor.read_u32_le()?,
        ];
        let name_len = cursor.read_u16_le()?;
        let name = String::from_utf8_lossy(cursor.read_bytes(usize::from(name_len))?).into_owned();
        Ok(Self {
            id,
            type_code,
            elem_size,
            dims,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::Field;

    #[test]
    fn test_entry_layout_is_bit_exact() {
        let registry = Registry::empty();
        let id = registry
            .insert("X", TypeDescriptor::scalar(ScalarKind::Dint))
            .expect("insert should succeed");

        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        let state = metatag.lock();
        let blob = &state.data;

        assert_eq!(blob.len(), ENTRY_HEADER_BYTES + 1);
        assert_eq!(&blob[0..4], &id.to_le_bytes());
        assert_eq!(&blob[4..6], &TYPE_CODE.to_le_bytes());
        assert_eq!(&blob[6..8], &4u16.to_le_bytes()); // DINT element size
        assert_eq!(&blob[8..12], &0u32.to_le_bytes()); // dims[0]: scalar
        assert_eq!(&blob[12..16], &0u32.to_le_bytes());
        assert_eq!(&blob[16..20], &0u32.to_le_bytes());
        assert_eq!(&blob[20..22], &1u16.to_le_bytes());
        assert_eq!(&blob[22..23], b"X"); // raw bytes, no terminator
    }

    #[test]
    fn test_array_entry_reports_length_and_element_size() {
        let registry = Registry::empty();
        let id = registry
            .insert(
                "AXES",
                TypeDescriptor::array(7, TypeDescriptor::scalar(ScalarKind::Dint)),
            )
            .expect("insert should succeed");

        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        let entries = DirectoryEntry::parse_all(&metatag.lock().data).expect("parse");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].elem_size, 4);
        assert_eq!(entries[0].dims, [7, 0, 0]);
        assert_eq!(entries[0].name, "AXES");
    }

    #[test]
    fn test_struct_entry_has_zero_dims() {
        let registry = Registry::empty();
        registry
            .insert(
                "PAIR",
                TypeDescriptor::struct_of(vec![
                    Field::new("a", TypeDescriptor::scalar(ScalarKind::Int)),
                    Field::new("b", TypeDescriptor::scalar(ScalarKind::Int)),
                ]),
            )
            .expect("insert should succeed");

        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        let entries = DirectoryEntry::parse_all(&metatag.lock().data).expect("parse");
        assert_eq!(entries[0].dims, [0, 0, 0]);
        assert_eq!(entries[0].elem_size, 4); // whole struct size
        assert_eq!(entries[0].type_code, TYPE_CODE);
    }

    #[test]
    fn test_directory_lists_all_tags_in_id_order_except_itself() {
        let registry = Registry::new().expect("registry creation should succeed");
        registry
            .insert("EXTRA", TypeDescriptor::scalar(ScalarKind::Lint))
            .expect("insert should succeed");

        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        let entries = DirectoryEntry::parse_all(&metatag.lock().data).expect("parse");

        assert_eq!(entries.len(), registry.len() - 1); // directory excluded
        assert!(entries.iter().all(|e| e.id != METATAG_ID));
        let ids: Vec<u32> = entries.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_consecutive_lookups_are_byte_identical() {
        let registry = Registry::new().expect("registry creation should succeed");
        let first = registry.lookup(METATAG_ID).expect("directory lookup");
        let first_blob = first.lock().data.clone();
        let second = registry.lookup(METATAG_ID).expect("directory lookup");
        let second_blob = second.lock().data.clone();
        assert_eq!(first_blob, second_blob);
        // Same cached node, not merely an equal copy.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_insert_invalidates_directory() {
        let registry = Registry::new().expect("registry creation should succeed");
        let before = registry.lookup(METATAG_ID).expect("directory lookup");
        let before_len = before.lock().data.len();

        let id = registry
            .insert("NEWCOMER", TypeDescriptor::scalar(ScalarKind::Int))
            .expect("insert should succeed");

        let after = registry.lookup(METATAG_ID).expect("directory lookup");
        assert!(!Arc::ptr_eq(&before, &after));
        let entries = DirectoryEntry::parse_all(&after.lock().data).expect("parse");
        assert!(entries.iter().any(|e| e.id == id && e.name == "NEWCOMER"));
        assert!(after.lock().data.len() > before_len);
    }

    #[test]
    fn test_remove_invalidates_directory() {
        let registry = Registry::new().expect("registry creation should succeed");
        let id = registry
            .insert("DOOMED", TypeDescriptor::scalar(ScalarKind::Int))
            .expect("insert should succeed");
        let _ = registry.lookup(METATAG_ID).expect("directory lookup");

        registry.remove(id).expect("remove should succeed");
        let after = registry.lookup(METATAG_ID).expect("directory lookup");
        let entries = DirectoryEntry::parse_all(&after.lock().data).expect("parse");
        assert!(entries.iter().all(|e| e.id != id));
    }

    #[test]
    fn test_insert_under_reserved_name_regenerates() {
        let registry = Registry::new().expect("registry creation should succeed");
        let id = registry
            .insert(METATAG_NAME, TypeDescriptor::scalar(ScalarKind::Int))
            .expect("@tags insert should succeed");
        assert_eq!(id, METATAG_ID);

        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        let entries = DirectoryEntry::parse_all(&metatag.lock().data).expect("parse");
        assert_eq!(entries.len(), registry.len() - 1);
    }

    #[test]
    fn test_empty_registry_yields_empty_directory() {
        let registry = Registry::empty();
        let metatag = registry.lookup(METATAG_ID).expect("directory lookup");
        assert_eq!(metatag.lock().data.len(), 0);
        assert_eq!(
            DirectoryEntry::parse_all(&metatag.lock().data)
                .expect("parse")
                .len(),
            0
        );
    }
}
