// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for plcstub operations.

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by plcstub operations.
///
/// `NotFound` and `BadParam` are ordinary status values a client is expected
/// to handle; `OutOfMemory` is returned instead of aborting so a caller that
/// wants the classic fail-fast stub behavior can simply `unwrap()`.
///
/// # Example
///
/// ```rust
/// use plcstub::{Registry, Error};
///
/// let registry = Registry::new().unwrap();
/// match registry.lookup(9999) {
///     Err(Error::NotFound(id)) => println!("no tag {}", id),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => println!("found"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Status Errors (returned to callers, never fatal)
    // ========================================================================
    /// No tag with the given id exists in the registry.
    NotFound(u32),
    /// Invalid argument at the API boundary (empty name, bad offset, ...).
    BadParam(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Buffer allocation failed.
    OutOfMemory,

    // ========================================================================
    // Internal Errors
    // ========================================================================
    /// Directory blob encoding or decoding failed.
    Serialization(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "Tag not found: {}", id),
            Error::BadParam(msg) => write!(f, "Bad parameter: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::Serialization(msg) => write!(f, "Directory encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
