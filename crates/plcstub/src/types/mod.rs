// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive type descriptors for tag payloads.
//!
//! A tag's type is one of the six Logix scalar kinds, a fixed-length
//! one-dimensional array, or an ordered struct. The discriminant is an
//! explicit enum variant, never inferred from the shape of a pointer;
//! composites own deep copies of their children, so `Clone` is always a
//! structurally independent duplicate and `Drop` releases the whole tree.

/// The six scalar tag kinds and their fixed widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Sint,
    Int,
    Dint,
    Real,
    Lint,
}

impl ScalarKind {
    /// Width of one value of this kind in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Bool | Self::Sint => 1,
            Self::Int => 2,
            Self::Dint | Self::Real => 4,
            Self::Lint => 8,
        }
    }

    /// Controller-style display name ("BOOL", "DINT", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Sint => "SINT",
            Self::Int => "INT",
            Self::Dint => "DINT",
            Self::Real => "REAL",
            Self::Lint => "LINT",
        }
    }
}

/// One named struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeDescriptor,
}

impl Field {
    /// Create a new field, taking ownership of the type.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A complete tag type.
///
/// `Error` is the poison value for an unusable type request: size 0, not a
/// scalar, and not a valid child of a composite. Feeding it to
/// [`Registry::insert`](crate::Registry::insert) is rejected with `BadParam`;
/// it exists so a bad request is surfaced at the boundary rather than
/// silently tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Unusable type (size 0, rejected at insert).
    Error,
    /// Fixed-width primitive.
    Scalar(ScalarKind),
    /// Fixed-length homogeneous sequence (one dimension only).
    Array { len: u16, elem: Box<TypeDescriptor> },
    /// Named ordered field list; order is significant for size and layout.
    Struct { fields: Vec<Field> },
}

impl TypeDescriptor {
    /// Create a scalar descriptor.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }

    /// Create an array descriptor, taking ownership of the element type.
    ///
    /// An `Error` element poisons the whole array.
    pub fn array(len: u16, elem: TypeDescriptor) -> Self {
        if elem.is_error() {
            return Self::Error;
        }
        Self::Array {
            len,
            elem: Box::new(elem),
        }
    }

    /// Create a struct descriptor, taking ownership of the fields.
    ///
    /// Any `Error` field poisons the whole struct.
    pub fn struct_of(fields: Vec<Field>) -> Self {
        if fields.iter().any(|f| f.ty.is_error()) {
            return Self::Error;
        }
        Self::Struct { fields }
    }

    /// Total payload size in bytes.
    ///
    /// Scalars use the fixed width table, arrays multiply by length, structs
    /// sum their fields in declaration order, and `Error` is 0. Computed in
    /// `usize`, so a maximal `u16` array length does not wrap.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Error => 0,
            Self::Scalar(kind) => kind.size_bytes(),
            Self::Array { len, elem } => elem.size_bytes() * usize::from(*len),
            Self::Struct { fields } => fields.iter().map(|f| f.ty.size_bytes()).sum(),
        }
    }

    /// True only for the six scalar kinds (`Error` is not a scalar).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// True for the poison value.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// The scalar kind, if this is a scalar.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Array length, if this is an array.
    pub fn array_len(&self) -> Option<u16> {
        match self {
            Self::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    /// Size in bytes of one element: the element size for arrays, the whole
    /// payload size otherwise. This is what the tag directory reports.
    pub fn element_size(&self) -> usize {
        match self {
            Self::Array { elem, .. } => elem.size_bytes(),
            other => other.size_bytes(),
        }
    }

    /// Struct fields, if this is a struct.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Self::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    /// Display name of the top-level variant ("BOOL", "ARRAY", "STRUCT", "ERROR").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Scalar(kind) => kind.name(),
            Self::Array { .. } => "ARRAY",
            Self::Struct { .. } => "STRUCT",
        }
    }
}
