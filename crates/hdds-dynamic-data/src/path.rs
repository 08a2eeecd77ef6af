// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member path expressions.
//!
//! Grammar:
//!
//! ```text
//! path      ::= segment ('.' segment)*
//! segment   ::= identifier brackets* | brackets+     (bracket-only: first segment only)
//! brackets  ::= '[' index (',' index)* ']'
//! index     ::= digit+
//! ```
//!
//! `grid[1][2]` and `grid[1,2]` address the same element: indices
//! accumulate until they cover all dimensions of the array being indexed.
//! Resolution is type-only; sequence lengths are checked when the
//! resolution is walked against a sample.

use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::member::{self, MemberId, MemberKey};
use crate::types::{TypeDescriptor, TypeKind};
use std::sync::Arc;

/// Result of resolving a key against a type.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResolution {
    /// Ids to loan, in order, to reach the leaf's parent from the root.
    pub loans: Vec<MemberId>,
    /// Id of the leaf within its parent.
    pub leaf: MemberId,
    /// Type of the leaf's parent.
    pub leaf_parent_type: Arc<TypeDescriptor>,
}

impl PathResolution {
    /// Loans followed by the leaf.
    pub fn steps(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.loans.iter().copied().chain(std::iter::once(self.leaf))
    }
}

/// One parsed segment: optional member name plus bracketed indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'p> {
    pub(crate) name: Option<&'p str>,
    pub(crate) indices: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketState {
    ExpectOpenOrEnd,
    ExpectIndex,
    ExpectCloseOrSep,
}

/// Split a path into segments, failing at the first malformed token.
pub(crate) fn parse(path: &str) -> Result<Vec<Segment<'_>>> {
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        return Err(DynamicDataError::path(path, 0, "empty path"));
    }

    let mut segments = Vec::new();
    let mut pos = 0;
    loop {
        let start = pos;
        while bytes
            .get(pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            pos += 1;
        }
        let name = &path[start..pos];
        if bytes.get(start).is_some_and(u8::is_ascii_digit) && !name.is_empty() {
            return Err(DynamicDataError::path(
                path,
                start,
                "member name cannot start with a digit",
            ));
        }
        if name.is_empty() && !(segments.is_empty() && bytes.get(pos) == Some(&b'[')) {
            return Err(DynamicDataError::path(path, pos, "expected member name"));
        }

        let mut indices = Vec::new();
        let mut state = BracketState::ExpectOpenOrEnd;
        loop {
            match (state, bytes.get(pos).copied()) {
                (BracketState::ExpectOpenOrEnd, Some(b'[')) => {
                    state = BracketState::ExpectIndex;
                    pos += 1;
                }
                (BracketState::ExpectOpenOrEnd, Some(b'.') | None) => break,
                (BracketState::ExpectOpenOrEnd, Some(_)) => {
                    return Err(DynamicDataError::path(path, pos, "expected '[' or '.'"));
                }
                (BracketState::ExpectIndex, Some(b'0'..=b'9')) => {
                    let digits = pos;
                    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                        pos += 1;
                    }
                    let index = path[digits..pos]
                        .parse()
                        .map_err(|_| DynamicDataError::path(path, digits, "index too large"))?;
                    indices.push(index);
                    state = BracketState::ExpectCloseOrSep;
                }
                (BracketState::ExpectIndex, _) => {
                    return Err(DynamicDataError::path(path, pos, "expected index"));
                }
                (BracketState::ExpectCloseOrSep, Some(b',')) => {
                    state = BracketState::ExpectIndex;
                    pos += 1;
                }
                (BracketState::ExpectCloseOrSep, Some(b']')) => {
                    state = BracketState::ExpectOpenOrEnd;
                    pos += 1;
                }
                (BracketState::ExpectCloseOrSep, _) => {
                    return Err(DynamicDataError::path(path, pos, "expected ',' or ']'"));
                }
            }
        }

        segments.push(Segment {
            name: (!name.is_empty()).then_some(name),
            indices,
        });

        if bytes.get(pos) == Some(&b'.') {
            pos += 1;
        } else {
            break;
        }
    }
    Ok(segments)
}

/// Resolve a path expression against a type.
///
/// ```
/// use hdds_dynamic_data::{resolve, MemberId, PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder};
/// use std::sync::Arc;
///
/// let grid = Arc::new(TypeDescriptor::array(
///     Arc::new(TypeDescriptor::primitive("int32", PrimitiveKind::I32)),
///     vec![3, 4],
/// ));
/// let desc = Arc::new(TypeDescriptorBuilder::new("Board").field_with_type("cells", grid).build());
///
/// let res = resolve(&desc, "cells[1][2]").unwrap();
/// assert_eq!(res.loans, vec![MemberId(1)]);
/// assert_eq!(res.leaf, MemberId(7));
/// ```
pub fn resolve(desc: &Arc<TypeDescriptor>, path: &str) -> Result<PathResolution> {
    resolve_key(
        desc,
        &MemberKey::Name(path),
        DataProperty::default().max_path_depth,
    )
}

/// Resolve any member key. Plain names and indices skip the parser.
pub(crate) fn resolve_key(
    desc: &Arc<TypeDescriptor>,
    key: &MemberKey<'_>,
    max_depth: usize,
) -> Result<PathResolution> {
    let leaf = match key {
        MemberKey::Name(name) if !name.is_empty() && !key.is_path() => {
            member::name_to_native_id(desc, name)?
        }
        MemberKey::Name(path) => return resolve_path(desc, path, max_depth),
        MemberKey::Index(index) => member::to_native_id(desc, *index)?,
        MemberKey::Indices(indices) => member::indices_to_native_id(desc, indices)?,
    };
    Ok(PathResolution {
        loans: Vec::new(),
        leaf,
        leaf_parent_type: desc.clone(),
    })
}

fn resolve_path(
    desc: &Arc<TypeDescriptor>,
    path: &str,
    max_depth: usize,
) -> Result<PathResolution> {
    let segments = parse(path)?;
    if segments.len() > max_depth {
        return Err(DynamicDataError::path(
            path,
            0,
            format!("more than {} segments", max_depth),
        ));
    }

    let mut current = desc.clone();
    let mut parent = desc.clone();
    let mut steps = Vec::new();
    for segment in &segments {
        if let Some(name) = segment.name {
            let id = member::name_to_native_id(&current, name)?;
            let child = member::child_type(&current, id)?.clone();
            parent = std::mem::replace(&mut current, child);
            steps.push(id);
        }

        let mut rest = segment.indices.as_slice();
        while !rest.is_empty() {
            let rank = match &current.resolved().kind {
                TypeKind::Array(arr) => arr.dimensions.len(),
                TypeKind::Sequence(_) => 1,
                _ => {
                    return Err(DynamicDataError::type_mismatch(
                        "array or sequence",
                        current.member_kind().name(),
                    ))
                }
            };
            if rest.len() < rank {
                return Err(DynamicDataError::DimensionMismatch {
                    expected: rank,
                    got: rest.len(),
                });
            }
            let (head, tail) = rest.split_at(rank);
            let id = member::indices_to_native_id(&current, head)?;
            let child = member::child_type(&current, id)?.clone();
            parent = std::mem::replace(&mut current, child);
            steps.push(id);
            rest = tail;
        }
    }

    let leaf = steps
        .pop()
        .ok_or_else(|| DynamicDataError::path(path, 0, "path addresses no member"))?;
    log::trace!("[dynamic] resolved '{}' -> {:?} / {}", path, steps, leaf);
    Ok(PathResolution {
        loans: steps,
        leaf,
        leaf_parent_type: parent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveKind, TypeDescriptorBuilder, UnionBuilder};

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive("", kind))
    }

    fn nested() -> Arc<TypeDescriptor> {
        let c = Arc::new(
            TypeDescriptorBuilder::new("C")
                .field("c", PrimitiveKind::I32)
                .build(),
        );
        let a = Arc::new(
            TypeDescriptorBuilder::new("A")
                .field("pad", PrimitiveKind::U8)
                .sequence_field_of("b", c)
                .build(),
        );
        let grid = Arc::new(TypeDescriptor::array(prim(PrimitiveKind::I16), vec![3, 4]));
        Arc::new(
            TypeDescriptorBuilder::new("Root")
                .field_with_type("a", a)
                .field_with_type("grid", grid)
                .build(),
        )
    }

    #[test]
    fn test_parse_segments() {
        let segs = parse("a.b[1].c").expect("parse");
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].name, Some("a"));
        assert_eq!(segs[1].indices, vec![1]);
        assert_eq!(segs[2].name, Some("c"));

        let segs = parse("m[1][2]").expect("parse");
        assert_eq!(segs[0].indices, vec![1, 2]);
        let segs = parse("m[1,2]").expect("parse");
        assert_eq!(segs[0].indices, vec![1, 2]);
        let segs = parse("[3]").expect("parse");
        assert_eq!(segs[0].name, None);
    }

    #[test]
    fn test_parse_errors_report_position() {
        let cases = [
            ("", 0),
            ("a.", 2),
            ("a[", 2),
            ("a[]", 2),
            ("a[1", 3),
            ("a[1;2]", 3),
            ("a[1]x", 4),
            ("a.[1]", 2),
            ("a..b", 2),
            ("1a", 0),
            ("a[99999999999999999999999]", 2),
        ];
        for (path, position) in cases {
            match parse(path) {
                Err(DynamicDataError::PathSyntax { position: p, .. }) => {
                    assert_eq!(p, position, "path {:?}", path)
                }
                other => panic!("{:?} parsed as {:?}", path, other),
            }
        }
    }

    #[test]
    fn test_resolve_nested_path() {
        let desc = nested();
        let res = resolve(&desc, "a.b[1].c").expect("resolve");
        assert_eq!(res.loans, vec![MemberId(1), MemberId(2), MemberId(2)]);
        assert_eq!(res.leaf, MemberId(1));
        assert_eq!(res.leaf_parent_type.name, "C");
        assert_eq!(res.steps().count(), 4);
    }

    #[test]
    fn test_resolve_multi_dim() {
        let desc = nested();
        let a = resolve(&desc, "grid[1][2]").expect("brackets");
        let b = resolve(&desc, "grid[1,2]").expect("comma");
        assert_eq!(a, b);
        assert_eq!(a.leaf, MemberId(7));

        assert_eq!(
            resolve(&desc, "grid[1]"),
            Err(DynamicDataError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            resolve(&desc, "grid[2,4]"),
            Err(DynamicDataError::IndexOutOfRange { index: 4, bound: 4 })
        );
    }

    #[test]
    fn test_resolve_errors() {
        let desc = nested();
        assert!(matches!(
            resolve(&desc, "a.missing"),
            Err(DynamicDataError::UnknownMember(ref n)) if n == "missing"
        ));
        assert!(matches!(
            resolve(&desc, "a.pad[0]"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        assert!(matches!(
            resolve(&desc, "grid.x"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_max_depth() {
        let desc = nested();
        let key = MemberKey::Name("a.b[0].c");
        assert!(resolve_key(&desc, &key, 3).is_ok());
        assert!(matches!(
            resolve_key(&desc, &key, 2),
            Err(DynamicDataError::PathSyntax { .. })
        ));
    }

    #[test]
    fn test_union_case_by_name() {
        let desc = Arc::new(
            UnionBuilder::with_i32_discriminator("U")
                .primitive_case("a", 4, PrimitiveKind::I32)
                .build(),
        );
        let res = resolve_key(&desc, &MemberKey::Name("a"), 32).expect("case");
        assert_eq!(res.leaf, MemberId(4));
        assert!(res.loans.is_empty());
    }
}
