// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversions between host values and sample storage.

use super::DynamicData;
use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::member::{self, MemberId};
use crate::native::{default_scalar, PrimitiveVec, Scalar, Storage};
use crate::types::{EnumDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::value::{EnumMember, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// True if both descriptors describe the same type.
pub(crate) fn same_type(a: &Arc<TypeDescriptor>, b: &Arc<TypeDescriptor>) -> bool {
    Arc::ptr_eq(a, b) || a.resolved() == b.resolved()
}

/// Enumerator for `ordinal` in the enum type of member `id` of `context`.
///
/// `context` may be a struct (the member's own type), a union (the type of
/// the case selected by `id`) or a collection (the element type).
pub(crate) fn resolve_enum(
    context: &TypeDescriptor,
    id: MemberId,
    ordinal: i32,
) -> Result<EnumMember> {
    enum_member(member::child_type(context, id)?, ordinal)
}

/// Enumerator of `desc` with the given ordinal.
pub(crate) fn enum_member(desc: &TypeDescriptor, ordinal: i32) -> Result<EnumMember> {
    let resolved = desc.resolved();
    let enumeration = resolved
        .enumeration()
        .ok_or_else(|| DynamicDataError::type_mismatch("enum", resolved.member_kind().name()))?;
    enumeration
        .variant_by_value(ordinal)
        .map(|v| EnumMember::new(v.name.clone(), v.value))
        .ok_or_else(|| DynamicDataError::UnknownEnumerator {
            type_name: resolved.name.clone(),
            ordinal,
        })
}

/// Host value of a scalar, with enums left as raw `I32` ordinals.
pub(crate) fn raw_value(scalar: Scalar) -> Value {
    match scalar {
        Scalar::Bool(v) => Value::Bool(v),
        Scalar::I8(v) => Value::I8(v),
        Scalar::I16(v) => Value::I16(v),
        Scalar::I32(v) | Scalar::Enum(v) => Value::I32(v),
        Scalar::I64(v) => Value::I64(v),
        Scalar::U8(v) => Value::U8(v),
        Scalar::U16(v) => Value::U16(v),
        Scalar::U32(v) => Value::U32(v),
        Scalar::U64(v) => Value::U64(v),
        Scalar::F32(v) => Value::F32(v),
        Scalar::F64(v) => Value::F64(v),
        Scalar::LongDouble(v) => Value::LongDouble(v),
        Scalar::Char(v) => Value::Char(v),
        Scalar::WChar(v) => Value::WChar(v),
        Scalar::String(v) => Value::String(v),
        Scalar::WString(v) => Value::WString(v),
    }
}

/// Host value of a scalar of type `desc`, resolving enum ordinals.
pub(crate) fn scalar_value(desc: &TypeDescriptor, scalar: Scalar) -> Result<Value> {
    match scalar {
        Scalar::Enum(ordinal) => enum_member(desc, ordinal).map(Value::Enum),
        other => Ok(raw_value(other)),
    }
}

/// Convert a host value into a scalar of type `desc`.
pub(crate) fn to_scalar(desc: &TypeDescriptor, value: Value) -> Result<Scalar> {
    let resolved = desc.resolved();
    match &resolved.kind {
        TypeKind::Primitive(kind) => primitive_scalar(*kind, value),
        TypeKind::Enum(e) => enum_ordinal(resolved, e, value).map(Scalar::Enum),
        _ => Err(DynamicDataError::type_mismatch(
            resolved.member_kind().name(),
            value.kind_name(),
        )),
    }
}

fn primitive_scalar(kind: PrimitiveKind, value: Value) -> Result<Scalar> {
    let expected = kind.member_kind().name();
    let got = value.kind_name();
    let mismatch = || DynamicDataError::type_mismatch(expected, got);

    macro_rules! integer {
        ($variant:ident, $ty:ty) => {{
            let wide = value.as_integer().ok_or_else(mismatch)?;
            <$ty>::try_from(wide).map(Scalar::$variant).map_err(|_| {
                DynamicDataError::type_mismatch(expected, format!("out-of-range {}", wide))
            })
        }};
    }

    match kind {
        PrimitiveKind::Bool => value.as_bool().map(Scalar::Bool).ok_or_else(mismatch),
        PrimitiveKind::I8 => integer!(I8, i8),
        PrimitiveKind::I16 => integer!(I16, i16),
        PrimitiveKind::I32 => integer!(I32, i32),
        PrimitiveKind::I64 => integer!(I64, i64),
        PrimitiveKind::U8 => integer!(U8, u8),
        PrimitiveKind::U16 => integer!(U16, u16),
        PrimitiveKind::U32 => integer!(U32, u32),
        PrimitiveKind::U64 => integer!(U64, u64),
        PrimitiveKind::F32 => match value {
            Value::F32(v) => Ok(Scalar::F32(v)),
            other => other
                .as_float()
                .map(|v| Scalar::F32(v as f32))
                .ok_or_else(mismatch),
        },
        PrimitiveKind::F64 => value.as_float().map(Scalar::F64).ok_or_else(mismatch),
        PrimitiveKind::LongDouble => match value {
            Value::LongDouble(v) => Ok(Scalar::LongDouble(v)),
            _ => Err(mismatch()),
        },
        PrimitiveKind::Char => single_char(&value)
            .filter(|c| u32::from(*c) <= 0xFF)
            .map(Scalar::Char)
            .ok_or_else(mismatch),
        PrimitiveKind::WChar => single_char(&value)
            .filter(|c| u32::from(*c) <= 0xFFFF)
            .map(Scalar::WChar)
            .ok_or_else(mismatch),
        PrimitiveKind::String { max_length } => {
            let s = owned_string(value).ok_or_else(mismatch)?;
            check_string_bound(s.len(), max_length)?;
            Ok(Scalar::String(s))
        }
        PrimitiveKind::WString { max_length } => {
            let s = owned_string(value).ok_or_else(mismatch)?;
            check_string_bound(s.encode_utf16().count(), max_length)?;
            Ok(Scalar::WString(s))
        }
    }
}

fn single_char(value: &Value) -> Option<char> {
    match value {
        Value::Char(c) | Value::WChar(c) => Some(*c),
        Value::String(s) | Value::WString(s) => {
            let mut chars = s.chars();
            chars.next().filter(|_| chars.next().is_none())
        }
        _ => None,
    }
}

fn owned_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) | Value::WString(s) => Some(s),
        _ => None,
    }
}

fn check_string_bound(length: usize, max: Option<usize>) -> Result<()> {
    match max {
        Some(max) if length > max => Err(DynamicDataError::StringTooLong { length, max }),
        _ => Ok(()),
    }
}

/// Ordinal for an enum assignment: an `EnumMember`, a raw integer or an
/// enumerator name. Raw integers are stored unchecked.
fn enum_ordinal(desc: &TypeDescriptor, e: &EnumDescriptor, value: Value) -> Result<i32> {
    match value {
        Value::Enum(m) => e
            .variant(&m.name)
            .or_else(|| e.variant_by_value(m.ordinal))
            .map(|v| v.value)
            .ok_or_else(|| DynamicDataError::UnknownEnumerator {
                type_name: desc.name.clone(),
                ordinal: m.ordinal,
            }),
        Value::String(name) | Value::WString(name) => {
            e.variant(&name).map(|v| v.value).ok_or_else(|| {
                DynamicDataError::type_mismatch(format!("enumerator of {}", desc.name), name)
            })
        }
        other => {
            let wide = other.as_integer().ok_or_else(|| {
                DynamicDataError::type_mismatch("enum", other.kind_name())
            })?;
            i32::try_from(wide).map_err(|_| {
                DynamicDataError::type_mismatch("enum", format!("out-of-range {}", wide))
            })
        }
    }
}

/// Check a new length against an array length or a sequence bound.
pub(crate) fn check_collection_len(desc: &TypeDescriptor, length: usize) -> Result<()> {
    match &desc.resolved().kind {
        TypeKind::Array(arr) => {
            let expected = arr.len().unwrap_or(0);
            if length == expected {
                Ok(())
            } else {
                Err(DynamicDataError::type_mismatch(
                    format!("{} elements", expected),
                    format!("{} elements", length),
                ))
            }
        }
        TypeKind::Sequence(seq) => match seq.max_length {
            Some(max) if length > max => Err(DynamicDataError::SequenceTooLong { length, max }),
            _ => Ok(()),
        },
        _ => Err(DynamicDataError::type_mismatch(
            "array or sequence",
            desc.member_kind().name(),
        )),
    }
}

/// Build storage of type `desc` from a host value.
///
/// Aggregates accept a sample of the same type or a mapping (struct
/// members by name, or a single `case -> value` entry for unions);
/// collections accept a list.
pub(crate) fn value_to_storage(
    desc: &Arc<TypeDescriptor>,
    value: Value,
    prop: &DataProperty,
) -> Result<Storage> {
    let resolved = desc.resolved();
    match (&resolved.kind, value) {
        (TypeKind::Primitive(_) | TypeKind::Enum(_), value) => {
            to_scalar(desc, value).map(Storage::Scalar)
        }
        (_, Value::Data(data)) => {
            if !same_type(&data.desc, desc) {
                return Err(DynamicDataError::type_mismatch(
                    desc.name.clone(),
                    data.desc.name.clone(),
                ));
            }
            if data.storage.contains_loan() {
                return Err(DynamicDataError::LoanOutstanding(data.desc.name.clone()));
            }
            Ok(data.storage)
        }
        (TypeKind::Struct(fields), Value::Map(mut map)) => {
            let mut slots = Vec::with_capacity(fields.len());
            for field in fields {
                match map.remove(&field.name) {
                    Some(Value::Null) | None if field.optional => slots.push(None),
                    Some(Value::Null) | None => {
                        return Err(DynamicDataError::NotOptional(field.name.clone()))
                    }
                    Some(v) => slots.push(Some(value_to_storage(&field.type_desc, v, prop)?)),
                }
            }
            match map.into_keys().next() {
                Some(unknown) => Err(DynamicDataError::UnknownMember(unknown)),
                None => Ok(Storage::Struct(slots)),
            }
        }
        (TypeKind::Union(u), Value::Map(map)) => {
            let entries = map.len();
            let mut iter = map.into_iter();
            match (iter.next(), iter.next()) {
                (Some((name, value)), None) => {
                    let (case, label) = u
                        .case_by_name(&name)
                        .ok_or(DynamicDataError::UnknownMember(name))?;
                    Ok(Storage::Union {
                        discriminator: label,
                        value: Some(Box::new(value_to_storage(&case.type_desc, value, prop)?)),
                    })
                }
                _ => Err(DynamicDataError::type_mismatch(
                    "single union case",
                    format!("{} entries", entries),
                )),
            }
        }
        (TypeKind::Array(_) | TypeKind::Sequence(_), Value::List(items)) => {
            check_collection_len(resolved, items.len())?;
            let element = resolved
                .element_type()
                .ok_or_else(|| DynamicDataError::type_mismatch("collection", desc.name.clone()))?;
            collection_storage(element, items, prop)
        }
        (_, value) => Err(DynamicDataError::type_mismatch(
            resolved.member_kind().name(),
            value.kind_name(),
        )),
    }
}

/// Collection storage holding `items` converted to `element`.
pub(crate) fn collection_storage(
    element: &Arc<TypeDescriptor>,
    items: Vec<Value>,
    prop: &DataProperty,
) -> Result<Storage> {
    match default_scalar(element) {
        Some(fill) => {
            let mut values = PrimitiveVec::filled(&fill, 0);
            values.reserve(items.len());
            for item in items {
                values.push(to_scalar(element, item)?)?;
            }
            Ok(Storage::Primitives(values))
        }
        None => items
            .into_iter()
            .map(|item| value_to_storage(element, item, prop))
            .collect::<Result<Vec<_>>>()
            .map(Storage::Complex),
    }
}

/// Host value of a member node of type `desc`.
///
/// Aggregates come back as nested sample copies; collections too, unless
/// `expand_collections` is set.
pub(crate) fn node_value(
    desc: &Arc<TypeDescriptor>,
    node: &Storage,
    prop: &DataProperty,
) -> Result<Value> {
    match node {
        Storage::Scalar(s) => scalar_value(desc, s.clone()),
        Storage::Loaned => Err(DynamicDataError::LoanOutstanding(desc.name.clone())),
        _ if prop.expand_collections && desc.is_collection() => {
            element_values(desc, node, prop).map(Value::List)
        }
        _ => {
            if node.contains_loan() {
                return Err(DynamicDataError::LoanOutstanding(desc.name.clone()));
            }
            Ok(Value::Data(DynamicData::from_parts(
                desc.clone(),
                node.clone(),
                prop.clone(),
            )))
        }
    }
}

/// Values of every element of a collection node.
pub(crate) fn element_values(
    desc: &TypeDescriptor,
    node: &Storage,
    prop: &DataProperty,
) -> Result<Vec<Value>> {
    let len = node.len().ok_or_else(|| {
        DynamicDataError::type_mismatch("array or sequence", desc.member_kind().name())
    })?;
    (0..len).map(|i| element_value(desc, node, i, prop)).collect()
}

/// Value of element `index` of a collection node of type `desc`.
pub(crate) fn element_value(
    desc: &TypeDescriptor,
    node: &Storage,
    index: usize,
    prop: &DataProperty,
) -> Result<Value> {
    let element = desc.element_type().ok_or_else(|| {
        DynamicDataError::type_mismatch("array or sequence", desc.member_kind().name())
    })?;
    let bound = node.len().unwrap_or(0);
    let out_of_range = DynamicDataError::IndexOutOfRange { index, bound };
    match node {
        Storage::Primitives(values) => {
            let scalar = values.get(index).ok_or(out_of_range)?;
            scalar_value(element, scalar)
        }
        Storage::Complex(items) => node_value(element, items.get(index).ok_or(out_of_range)?, prop),
        _ => Err(DynamicDataError::type_mismatch(
            "array or sequence",
            desc.member_kind().name(),
        )),
    }
}

/// Fully expanded value: structs and unions become maps, collections
/// become lists, unset optionals become `Null`.
pub(crate) fn expand(desc: &TypeDescriptor, node: &Storage) -> Result<Value> {
    match (&desc.resolved().kind, node) {
        (_, Storage::Loaned) => Err(DynamicDataError::LoanOutstanding(desc.name.clone())),
        (_, Storage::Scalar(s)) => scalar_value(desc, s.clone()),
        (TypeKind::Struct(fields), Storage::Struct(slots)) => fields
            .iter()
            .zip(slots)
            .map(|(field, slot)| {
                let value = match slot {
                    Some(n) => expand(&field.type_desc, n)?,
                    None => Value::Null,
                };
                Ok((field.name.clone(), value))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Value::Map),
        (TypeKind::Union(u), Storage::Union {
            discriminator,
            value,
        }) => {
            let mut map = BTreeMap::new();
            if let (Some(case), Some(v)) = (u.case_by_discriminator(*discriminator), value) {
                map.insert(case.name.clone(), expand(&case.type_desc, v)?);
            }
            Ok(Value::Map(map))
        }
        (_, Storage::Primitives(values)) => {
            let element = desc.element_type().ok_or_else(|| {
                DynamicDataError::type_mismatch("array or sequence", desc.member_kind().name())
            })?;
            values
                .iter()
                .map(|s| scalar_value(element, s))
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        (_, Storage::Complex(items)) => {
            let element = desc.element_type().ok_or_else(|| {
                DynamicDataError::type_mismatch("array or sequence", desc.member_kind().name())
            })?;
            items
                .iter()
                .map(|item| expand(element, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        _ => Err(DynamicDataError::type_mismatch(
            desc.member_kind().name(),
            "mismatched storage",
        )),
    }
}
