// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrency properties of the registry: id uniqueness under insert
//! storms, and lookup handles surviving racing removes.

use plcstub::{DirectoryEntry, Registry, ScalarKind, TypeDescriptor, METATAG_ID};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 16;
const INSERTS_PER_THREAD: usize = 100;

#[test]
fn concurrent_inserts_yield_distinct_ids() {
    let registry = Arc::new(Registry::new().expect("registry creation should succeed"));

    let mut handles = Vec::new();
    for t in 0..THREADS {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            let mut ids = Vec::with_capacity(INSERTS_PER_THREAD);
            for i in 0..INSERTS_PER_THREAD {
                let id = registry
                    .insert(
                        &format!("W{}_{}", t, i),
                        TypeDescriptor::scalar(ScalarKind::Dint),
                    )
                    .expect("insert should succeed");
                ids.push(id);
            }
            ids
        }));
    }

    let mut all_ids = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("worker should not panic") {
            assert_ne!(id, METATAG_ID);
            assert!(all_ids.insert(id), "duplicate id {} handed out", id);
        }
    }
    assert_eq!(all_ids.len(), THREADS * INSERTS_PER_THREAD);

    // No insert was lost: every id is still resolvable.
    for id in &all_ids {
        registry.lookup(*id).expect("inserted tag should exist");
    }
}

#[test]
fn lookup_handle_survives_racing_remove() {
    let registry = Arc::new(Registry::new().expect("registry creation should succeed"));

    let mut ids = Vec::new();
    for i in 0..200u32 {
        let id = registry
            .insert(&format!("RACE_{}", i), TypeDescriptor::scalar(ScalarKind::Dint))
            .expect("insert should succeed");
        let node = registry.lookup(id).expect("tag should exist");
        node.lock().data[..4].copy_from_slice(&0xA5A5_A5A5u32.to_le_bytes());
        ids.push(id);
    }

    let reader_ids = ids.clone();
    let reader_registry = registry.clone();
    let reader = thread::spawn(move || {
        for _ in 0..50 {
            let id = reader_ids[fastrand::usize(..reader_ids.len())];
            // A racing remove may win; a handle we did obtain must stay
            // fully readable regardless.
            if let Ok(node) = reader_registry.lookup(id) {
                let state = node.lock();
                let mut word = [0u8; 4];
                word.copy_from_slice(&state.data[..4]);
                assert_eq!(u32::from_le_bytes(word), 0xA5A5_A5A5);
                assert!(node.name().starts_with("RACE_"));
            }
        }
    });

    let remover_registry = registry.clone();
    let remover = thread::spawn(move || {
        for id in ids {
            remover_registry.remove(id).expect("remove should succeed");
        }
    });

    reader.join().expect("reader should not panic");
    remover.join().expect("remover should not panic");
}

#[test]
fn directory_reads_racing_inserts_always_parse() {
    let registry = Arc::new(Registry::new().expect("registry creation should succeed"));

    let writer_registry = registry.clone();
    let writer = thread::spawn(move || {
        for i in 0..100u32 {
            writer_registry
                .insert(&format!("HOT_{}", i), TypeDescriptor::scalar(ScalarKind::Int))
                .expect("insert should succeed");
        }
    });

    let reader_registry = registry.clone();
    let reader = thread::spawn(move || {
        for _ in 0..100 {
            let directory = reader_registry
                .lookup(METATAG_ID)
                .expect("directory lookup should succeed");
            let blob = directory.lock().data.clone();
            // Readers never observe a half-written directory.
            let entries = DirectoryEntry::parse_all(&blob).expect("blob should parse");
            for entry in &entries {
                assert_ne!(entry.id, METATAG_ID);
            }
        }
    });

    writer.join().expect("writer should not panic");
    reader.join().expect("reader should not panic");
}
