// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member keys, native member ids and resolved member descriptors.

use crate::error::{DynamicDataError, Result};
use crate::offset::offset;
use crate::path;
use crate::types::{MemberKind, TypeDescriptor, TypeKind};
use std::fmt;
use std::sync::Arc;

/// Native member id.
///
/// 1-based position for struct members and collection elements,
/// discriminator label for union members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public address of a member.
///
/// `Name` is a member name, or a path when it contains `.` or `[`.
/// `Index` is 0-based for structs and collections and a discriminator
/// label for unions. `Indices` addresses one element of a
/// multi-dimensional array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKey<'a> {
    Name(&'a str),
    Index(usize),
    Indices(Vec<usize>),
}

impl MemberKey<'_> {
    /// True for names that must go through the path parser.
    pub fn is_path(&self) -> bool {
        matches!(self, Self::Name(name) if name.contains(['.', '[']))
    }
}

impl fmt::Display for MemberKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(i) => write!(f, "[{}]", i),
            Self::Indices(indices) => {
                f.write_str("[")?;
                for (n, i) in indices.iter().enumerate() {
                    if n > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", i)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl<'a> From<&'a str> for MemberKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for MemberKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for MemberKey<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<const N: usize> From<[usize; N]> for MemberKey<'_> {
    fn from(indices: [usize; N]) -> Self {
        Self::Indices(indices.to_vec())
    }
}

impl From<Vec<usize>> for MemberKey<'_> {
    fn from(indices: Vec<usize>) -> Self {
        Self::Indices(indices)
    }
}

impl From<&[usize]> for MemberKey<'_> {
    fn from(indices: &[usize]) -> Self {
        Self::Indices(indices.to_vec())
    }
}

/// Resolved description of one member, computed per call.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: String,
    pub id: MemberId,
    /// Alias-resolved kind of the member.
    pub kind: MemberKind,
    /// Alias-resolved element kind, for collections.
    pub element_kind: Option<MemberKind>,
    /// Array length, sequence bound or string bound.
    pub element_count: Option<usize>,
    /// Array dimensions, empty for everything else.
    pub dimensions: Vec<usize>,
    pub is_key: bool,
    pub is_optional: bool,
    pub is_collection: bool,
}

/// Describe the member `key` of type `desc`.
///
/// `key` may be a path, in which case the leaf member is described.
pub fn member_info<'k>(
    desc: &Arc<TypeDescriptor>,
    key: impl Into<MemberKey<'k>>,
) -> Result<MemberDescriptor> {
    let resolution = path::resolve_key(desc, &key.into(), usize::MAX)?;
    describe(&resolution.leaf_parent_type, resolution.leaf)
}

/// Describe member `id` of `parent`.
pub(crate) fn describe(parent: &TypeDescriptor, id: MemberId) -> Result<MemberDescriptor> {
    let child = child_type(parent, id)?;
    let (is_key, is_optional) = match &parent.resolved().kind {
        TypeKind::Struct(fields) => field_position(fields.len(), id)
            .map(|i| (fields[i].key, fields[i].optional))
            .unwrap_or_default(),
        _ => (false, false),
    };
    let (element_kind, element_count, dimensions) = match &child.resolved().kind {
        TypeKind::Array(arr) => (
            Some(arr.element_type.member_kind()),
            arr.len(),
            arr.dimensions.clone(),
        ),
        TypeKind::Sequence(seq) => (
            Some(seq.element_type.member_kind()),
            seq.max_length,
            Vec::new(),
        ),
        TypeKind::Primitive(p) => (None, p.max_length(), Vec::new()),
        _ => (None, None, Vec::new()),
    };
    let kind = child.member_kind();
    Ok(MemberDescriptor {
        name: member_name(parent, id),
        id,
        kind,
        element_kind,
        element_count,
        dimensions,
        is_key,
        is_optional,
        is_collection: kind.is_collection(),
    })
}

/// Convert a public index into a native id.
///
/// Structs and collections shift by one; union indices are discriminator
/// labels and pass through unchanged.
pub(crate) fn to_native_id(desc: &TypeDescriptor, index: usize) -> Result<MemberId> {
    let resolved = desc.resolved();
    match &resolved.kind {
        TypeKind::Union(u) => {
            let label = i64::try_from(index)
                .ok()
                .filter(|label| u.case_by_discriminator(*label).is_some())
                .ok_or_else(|| {
                    DynamicDataError::UnknownMember(format!("{}[{}]", desc.name, index))
                })?;
            Ok(MemberId(label))
        }
        TypeKind::Struct(fields) => {
            if index < fields.len() {
                shifted(index)
            } else {
                Err(DynamicDataError::UnknownMember(format!(
                    "{}[{}]",
                    desc.name, index
                )))
            }
        }
        TypeKind::Array(arr) => {
            let bound = arr.len().unwrap_or(0);
            if index < bound {
                shifted(index)
            } else {
                Err(DynamicDataError::IndexOutOfRange { index, bound })
            }
        }
        TypeKind::Sequence(_) => shifted(index),
        _ => Err(not_indexable(resolved)),
    }
}

/// Native id of a multi-dimensional array element.
pub(crate) fn indices_to_native_id(desc: &TypeDescriptor, indices: &[usize]) -> Result<MemberId> {
    let resolved = desc.resolved();
    match &resolved.kind {
        TypeKind::Array(arr) => shifted(offset(&arr.dimensions, indices)?),
        TypeKind::Sequence(_) => match indices {
            [index] => shifted(*index),
            _ => Err(DynamicDataError::DimensionMismatch {
                expected: 1,
                got: indices.len(),
            }),
        },
        _ => Err(not_indexable(resolved)),
    }
}

/// Native id of a named struct member or union case.
pub(crate) fn name_to_native_id(desc: &TypeDescriptor, name: &str) -> Result<MemberId> {
    let resolved = desc.resolved();
    match &resolved.kind {
        TypeKind::Struct(fields) => fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| DynamicDataError::UnknownMember(name.to_string()))
            .and_then(shifted),
        TypeKind::Union(u) => u
            .case_by_name(name)
            .map(|(_, label)| MemberId(label))
            .ok_or_else(|| DynamicDataError::UnknownMember(name.to_string())),
        _ => Err(DynamicDataError::type_mismatch(
            "struct or union",
            resolved.member_kind().name(),
        )),
    }
}

/// Type of member `id` of `desc`.
pub(crate) fn child_type(desc: &TypeDescriptor, id: MemberId) -> Result<&Arc<TypeDescriptor>> {
    let resolved = desc.resolved();
    match &resolved.kind {
        TypeKind::Struct(fields) => field_position(fields.len(), id)
            .map(|i| &fields[i].type_desc)
            .ok_or_else(|| DynamicDataError::UnknownMember(member_name(desc, id))),
        TypeKind::Union(u) => u
            .case_by_discriminator(id.0)
            .map(|c| &c.type_desc)
            .ok_or_else(|| DynamicDataError::UnknownMember(member_name(desc, id))),
        TypeKind::Array(arr) => Ok(&arr.element_type),
        TypeKind::Sequence(seq) => Ok(&seq.element_type),
        _ => Err(not_indexable(resolved)),
    }
}

/// True if member `id` of `desc` is declared `@optional`.
pub(crate) fn is_optional(desc: &TypeDescriptor, id: MemberId) -> bool {
    match desc.fields() {
        Some(fields) => field_position(fields.len(), id).is_some_and(|i| fields[i].optional),
        None => false,
    }
}

/// Display name of member `id`, for descriptors and error messages.
pub(crate) fn member_name(desc: &TypeDescriptor, id: MemberId) -> String {
    let resolved = desc.resolved();
    let name = match &resolved.kind {
        TypeKind::Struct(fields) => {
            field_position(fields.len(), id).map(|i| fields[i].name.clone())
        }
        TypeKind::Union(u) => u.case_by_discriminator(id.0).map(|c| c.name.clone()),
        TypeKind::Array(_) | TypeKind::Sequence(_) => Some(format!("[{}]", id.0 - 1)),
        _ => None,
    };
    name.unwrap_or_else(|| format!("{}#{}", desc.name, id))
}

fn field_position(len: usize, id: MemberId) -> Option<usize> {
    usize::try_from(id.0)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .filter(|i| *i < len)
}

fn shifted(index: usize) -> Result<MemberId> {
    i64::try_from(index)
        .ok()
        .and_then(|i| i.checked_add(1))
        .map(MemberId)
        .ok_or(DynamicDataError::IndexOutOfRange {
            index,
            bound: i64::MAX as usize,
        })
}

fn not_indexable(desc: &TypeDescriptor) -> DynamicDataError {
    DynamicDataError::type_mismatch(
        "struct, union or collection",
        desc.member_kind().name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveKind, TypeDescriptorBuilder, UnionBuilder};

    fn point() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("Point")
                .key_field("id", PrimitiveKind::U32)
                .field("x", PrimitiveKind::I32)
                .optional_field("y", PrimitiveKind::I32)
                .bounded_sequence_field("samples", PrimitiveKind::F32, 8)
                .multi_array_field(
                    "grid",
                    Arc::new(TypeDescriptor::primitive("int16", PrimitiveKind::I16)),
                    vec![3, 4],
                )
                .build(),
        )
    }

    #[test]
    fn test_struct_index_shift() {
        let desc = point();
        assert_eq!(to_native_id(&desc, 0), Ok(MemberId(1)));
        assert_eq!(to_native_id(&desc, 4), Ok(MemberId(5)));
        assert!(matches!(
            to_native_id(&desc, 5),
            Err(DynamicDataError::UnknownMember(_))
        ));
    }

    #[test]
    fn test_union_index_not_shifted() {
        let desc = UnionBuilder::with_i32_discriminator("U")
            .primitive_case("a", 2, PrimitiveKind::I32)
            .primitive_case("b", 7, PrimitiveKind::F64)
            .build();
        assert_eq!(to_native_id(&desc, 2), Ok(MemberId(2)));
        assert_eq!(to_native_id(&desc, 7), Ok(MemberId(7)));
        assert!(to_native_id(&desc, 3).is_err());
    }

    #[test]
    fn test_member_info_struct() {
        let desc = point();
        let id = member_info(&desc, "id").expect("id");
        assert_eq!(id.id, MemberId(1));
        assert!(id.is_key);
        assert_eq!(id.kind, MemberKind::UInt32);

        let y = member_info(&desc, 2usize).expect("y");
        assert_eq!(y.name, "y");
        assert!(y.is_optional);

        let samples = member_info(&desc, "samples").expect("samples");
        assert!(samples.is_collection);
        assert_eq!(samples.kind, MemberKind::Sequence);
        assert_eq!(samples.element_kind, Some(MemberKind::Float32));
        assert_eq!(samples.element_count, Some(8));

        let grid = member_info(&desc, "grid").expect("grid");
        assert_eq!(grid.dimensions, vec![3, 4]);
        assert_eq!(grid.element_count, Some(12));
    }

    #[test]
    fn test_member_info_path_leaf() {
        let desc = point();
        let cell = member_info(&desc, "grid[1][2]").expect("cell");
        assert_eq!(cell.id, MemberId(7));
        assert_eq!(cell.kind, MemberKind::Int16);
        assert_eq!(cell.name, "[6]");
    }

    #[test]
    fn test_unknown_member() {
        let desc = point();
        assert_eq!(
            member_info(&desc, "z"),
            Err(DynamicDataError::UnknownMember("z".into()))
        );
    }

    #[test]
    fn test_member_key_conversions() {
        assert_eq!(MemberKey::from("a"), MemberKey::Name("a"));
        assert_eq!(MemberKey::from(3usize), MemberKey::Index(3));
        assert_eq!(MemberKey::from([1usize, 2]), MemberKey::Indices(vec![1, 2]));
        assert!(MemberKey::from("a.b").is_path());
        assert!(!MemberKey::from("a").is_path());
        assert_eq!(MemberKey::Indices(vec![1, 2]).to_string(), "[1,2]");
    }
}
