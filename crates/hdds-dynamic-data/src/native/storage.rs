// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample storage tree addressed by native member ids.
//!
//! Struct members and collection elements are 1-based; union members are
//! addressed by discriminator label. Scalar and enum collections are kept
//! as typed vectors so bulk transfers are a single slice copy.

use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::member::{self, MemberId};
use crate::types::{PrimitiveKind, TypeDescriptor, TypeKind, UnionDescriptor};
use crate::value::LongDouble;
use std::ptr;

macro_rules! define_scalars {
    ($($variant:ident($ty:ty) => $name:literal),* $(,)?) => {
        /// One stored primitive or enum ordinal.
        #[derive(Debug, Clone, PartialEq)]
        pub(crate) enum Scalar {
            $($variant($ty),)*
        }

        /// Homogeneous primitive collection.
        #[derive(Debug, Clone, PartialEq)]
        pub(crate) enum PrimitiveVec {
            $($variant(Vec<$ty>),)*
        }

        impl Scalar {
            pub(crate) fn kind_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $name,)*
                }
            }
        }

        impl PrimitiveVec {
            /// `len` copies of `fill`.
            pub(crate) fn filled(fill: &Scalar, len: usize) -> Self {
                match fill {
                    $(Scalar::$variant(v) => Self::$variant(vec![v.clone(); len]),)*
                }
            }

            pub(crate) fn kind_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $name,)*
                }
            }

            pub(crate) fn len(&self) -> usize {
                match self {
                    $(Self::$variant(v) => v.len(),)*
                }
            }

            pub(crate) fn reserve(&mut self, additional: usize) {
                match self {
                    $(Self::$variant(v) => v.reserve(additional),)*
                }
            }

            pub(crate) fn get(&self, index: usize) -> Option<Scalar> {
                match self {
                    $(Self::$variant(v) => v.get(index).cloned().map(Scalar::$variant),)*
                }
            }

            pub(crate) fn set(&mut self, index: usize, scalar: Scalar) -> Result<()> {
                let bound = self.len();
                match (self, scalar) {
                    $((Self::$variant(v), Scalar::$variant(s)) => {
                        let slot = v
                            .get_mut(index)
                            .ok_or(DynamicDataError::IndexOutOfRange { index, bound })?;
                        *slot = s;
                        Ok(())
                    })*
                    (this, other) => Err(DynamicDataError::type_mismatch(
                        this.kind_name(),
                        other.kind_name(),
                    )),
                }
            }

            pub(crate) fn push(&mut self, scalar: Scalar) -> Result<()> {
                match (self, scalar) {
                    $((Self::$variant(v), Scalar::$variant(s)) => {
                        v.push(s);
                        Ok(())
                    })*
                    (this, other) => Err(DynamicDataError::type_mismatch(
                        this.kind_name(),
                        other.kind_name(),
                    )),
                }
            }

            pub(crate) fn resize(&mut self, len: usize, fill: &Scalar) -> Result<()> {
                match (self, fill) {
                    $((Self::$variant(v), Scalar::$variant(s)) => {
                        v.resize(len, s.clone());
                        Ok(())
                    })*
                    (this, other) => Err(DynamicDataError::type_mismatch(
                        this.kind_name(),
                        other.kind_name(),
                    )),
                }
            }

            pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = Scalar> + '_ {
                (0..self.len()).filter_map(move |i| self.get(i))
            }
        }
    };
}

define_scalars! {
    Bool(bool) => "boolean",
    I8(i8) => "int8",
    I16(i16) => "int16",
    I32(i32) => "int32",
    I64(i64) => "int64",
    U8(u8) => "uint8",
    U16(u16) => "uint16",
    U32(u32) => "uint32",
    U64(u64) => "uint64",
    F32(f32) => "float32",
    F64(f64) => "float64",
    LongDouble(LongDouble) => "float128",
    Char(char) => "char8",
    WChar(char) => "char16",
    String(String) => "string",
    WString(String) => "wstring",
    Enum(i32) => "enum",
}

fn primitive_default(kind: &PrimitiveKind) -> Scalar {
    match kind {
        PrimitiveKind::Bool => Scalar::Bool(false),
        PrimitiveKind::I8 => Scalar::I8(0),
        PrimitiveKind::I16 => Scalar::I16(0),
        PrimitiveKind::I32 => Scalar::I32(0),
        PrimitiveKind::I64 => Scalar::I64(0),
        PrimitiveKind::U8 => Scalar::U8(0),
        PrimitiveKind::U16 => Scalar::U16(0),
        PrimitiveKind::U32 => Scalar::U32(0),
        PrimitiveKind::U64 => Scalar::U64(0),
        PrimitiveKind::F32 => Scalar::F32(0.0),
        PrimitiveKind::F64 => Scalar::F64(0.0),
        PrimitiveKind::LongDouble => Scalar::LongDouble(LongDouble::default()),
        PrimitiveKind::Char => Scalar::Char('\0'),
        PrimitiveKind::WChar => Scalar::WChar('\0'),
        PrimitiveKind::String { .. } => Scalar::String(String::new()),
        PrimitiveKind::WString { .. } => Scalar::WString(String::new()),
    }
}

/// Zero value of a primitive or enum type, `None` for complex types.
pub(crate) fn default_scalar(desc: &TypeDescriptor) -> Option<Scalar> {
    match &desc.resolved().kind {
        TypeKind::Primitive(p) => Some(primitive_default(p)),
        TypeKind::Enum(e) => Some(Scalar::Enum(e.default_value())),
        _ => None,
    }
}

/// Storage node of one sample or member.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Storage {
    Scalar(Scalar),
    /// Struct members in declaration order; `None` is an unset optional.
    Struct(Vec<Option<Storage>>),
    /// Active discriminator and the selected member, if any case matches.
    Union {
        discriminator: i64,
        value: Option<Box<Storage>>,
    },
    /// Array or sequence of primitives or enums.
    Primitives(PrimitiveVec),
    /// Array or sequence of structs, unions or collections.
    Complex(Vec<Storage>),
    /// Placeholder while the member is out on loan.
    Loaned,
}

/// Read-only view of a member slot.
pub(crate) enum Slot<'s> {
    Node(&'s Storage),
    Element(Scalar),
    /// Unset optional or inactive union member.
    Absent,
}

/// Mutable view of a member slot.
pub(crate) enum SlotMut<'s> {
    Node(&'s mut Storage),
    Element {
        values: &'s mut PrimitiveVec,
        index: usize,
    },
    Vacant(Vacant<'s>),
}

/// Slot that has no value yet and can be filled in.
pub(crate) enum Vacant<'s> {
    Optional(&'s mut Option<Storage>),
    Case {
        discriminator: &'s mut i64,
        value: &'s mut Option<Box<Storage>>,
        label: i64,
    },
}

impl<'s> Vacant<'s> {
    /// Fill the slot, selecting the union case if needed.
    pub(crate) fn install(self, storage: Storage) -> &'s mut Storage {
        match self {
            Self::Optional(slot) => slot.insert(storage),
            Self::Case {
                discriminator,
                value,
                label,
            } => {
                *discriminator = label;
                &mut **value.insert(Box::new(storage))
            }
        }
    }
}

impl Storage {
    /// Zero-initialized storage for `desc`. Optional members start unset.
    pub(crate) fn new(desc: &TypeDescriptor, prop: &DataProperty) -> Self {
        match &desc.resolved().kind {
            TypeKind::Primitive(p) => Self::Scalar(primitive_default(p)),
            TypeKind::Enum(e) => Self::Scalar(Scalar::Enum(e.default_value())),
            TypeKind::Struct(fields) => Self::Struct(
                fields
                    .iter()
                    .map(|f| (!f.optional).then(|| Self::new(&f.type_desc, prop)))
                    .collect(),
            ),
            TypeKind::Union(u) => {
                let discriminator = u
                    .cases
                    .iter()
                    .find_map(|c| c.labels.first().copied())
                    .unwrap_or_else(|| u.default_label());
                let value = u
                    .case_by_discriminator(discriminator)
                    .map(|c| Box::new(Self::new(&c.type_desc, prop)));
                Self::Union {
                    discriminator,
                    value,
                }
            }
            TypeKind::Array(arr) => {
                Self::collection(&arr.element_type, arr.len().unwrap_or(0), 0, prop)
            }
            TypeKind::Sequence(seq) => {
                let capacity = seq
                    .max_length
                    .map_or(prop.initial_sequence_capacity, |max| {
                        max.min(prop.initial_sequence_capacity)
                    });
                Self::collection(&seq.element_type, 0, capacity, prop)
            }
            TypeKind::Alias(target) => Self::new(target, prop),
        }
    }

    fn collection(
        element: &TypeDescriptor,
        len: usize,
        capacity: usize,
        prop: &DataProperty,
    ) -> Self {
        match default_scalar(element) {
            Some(fill) => {
                let mut values = PrimitiveVec::filled(&fill, len);
                values.reserve(capacity.saturating_sub(len));
                Self::Primitives(values)
            }
            None => {
                let mut items = Vec::with_capacity(len.max(capacity));
                items.extend((0..len).map(|_| Self::new(element, prop)));
                Self::Complex(items)
            }
        }
    }

    /// Number of set members: struct members present, 1 for an active
    /// union, collection length.
    pub(crate) fn member_count(&self) -> usize {
        match self {
            Self::Struct(slots) => slots.iter().filter(|s| s.is_some()).count(),
            Self::Union { value, .. } => usize::from(value.is_some()),
            Self::Primitives(values) => values.len(),
            Self::Complex(items) => items.len(),
            Self::Scalar(_) | Self::Loaned => 0,
        }
    }

    /// Collection length, `None` for non-collections.
    pub(crate) fn len(&self) -> Option<usize> {
        match self {
            Self::Primitives(values) => Some(values.len()),
            Self::Complex(items) => Some(items.len()),
            _ => None,
        }
    }

    /// True if this node or anything below it is out on loan.
    pub(crate) fn contains_loan(&self) -> bool {
        match self {
            Self::Loaned => true,
            Self::Scalar(_) | Self::Primitives(_) => false,
            Self::Struct(slots) => slots.iter().flatten().any(Self::contains_loan),
            Self::Union { value, .. } => value.as_deref().is_some_and(Self::contains_loan),
            Self::Complex(items) => items.iter().any(Self::contains_loan),
        }
    }

    /// Resize a collection, filling new elements with defaults of `element`.
    pub(crate) fn resize(
        &mut self,
        element: &TypeDescriptor,
        len: usize,
        prop: &DataProperty,
    ) -> Result<()> {
        match self {
            Self::Primitives(values) => {
                let fill = default_scalar(element).ok_or_else(|| {
                    DynamicDataError::type_mismatch(values.kind_name(), element.name.clone())
                })?;
                values.resize(len, &fill)
            }
            Self::Complex(items) => {
                if items.get(len..).is_some_and(|cut| cut.iter().any(Self::contains_loan)) {
                    return Err(DynamicDataError::LoanOutstanding(element.name.clone()));
                }
                items.resize_with(len, || Self::new(element, prop));
                Ok(())
            }
            _ => Err(DynamicDataError::type_mismatch("sequence", element.name.clone())),
        }
    }

    /// Reset member `id` to its initial state.
    pub(crate) fn clear_member(
        &mut self,
        desc: &TypeDescriptor,
        id: MemberId,
        prop: &DataProperty,
    ) -> Result<()> {
        let child = member::child_type(desc, id)?;
        match (&desc.resolved().kind, self) {
            (TypeKind::Struct(fields), Self::Struct(slots)) => {
                let index = position(desc, id, slots.len(), false)?;
                let slot = &mut slots[index];
                if slot.as_ref().is_some_and(Self::contains_loan) {
                    return Err(DynamicDataError::LoanOutstanding(fields[index].name.clone()));
                }
                *slot = (!fields[index].optional).then(|| Self::new(child, prop));
                Ok(())
            }
            (TypeKind::Union(u), Self::Union {
                discriminator,
                value,
            }) => {
                if !active_case(u, *discriminator, id)? {
                    return Ok(());
                }
                if value.as_deref().is_some_and(Self::contains_loan) {
                    return Err(DynamicDataError::LoanOutstanding(member::member_name(desc, id)));
                }
                *value = Some(Box::new(Self::new(child, prop)));
                Ok(())
            }
            (_, Self::Primitives(values)) => {
                let index = position(desc, id, values.len(), true)?;
                let fill = default_scalar(child)
                    .ok_or_else(|| DynamicDataError::type_mismatch("primitive", child.name.clone()))?;
                values.set(index, fill)
            }
            (_, Self::Complex(items)) => {
                let index = position(desc, id, items.len(), true)?;
                if items[index].contains_loan() {
                    return Err(DynamicDataError::LoanOutstanding(member::member_name(desc, id)));
                }
                items[index] = Self::new(child, prop);
                Ok(())
            }
            (_, node) => Err(shape_error(desc, node)),
        }
    }

    /// Reset every member. Fails if any part of the tree is out on loan.
    pub(crate) fn clear_all(&mut self, desc: &TypeDescriptor, prop: &DataProperty) -> Result<()> {
        if self.contains_loan() {
            return Err(DynamicDataError::LoanOutstanding(desc.name.clone()));
        }
        *self = Self::new(desc, prop);
        Ok(())
    }
}

/// Locate member `id` of `node` for reading.
pub(crate) fn slot<'s>(desc: &TypeDescriptor, node: &'s Storage, id: MemberId) -> Result<Slot<'s>> {
    let found = match (&desc.resolved().kind, node) {
        (TypeKind::Struct(_), Storage::Struct(slots)) => {
            slots[position(desc, id, slots.len(), false)?].as_ref()
        }
        (TypeKind::Union(u), Storage::Union {
            discriminator,
            value,
        }) => {
            if active_case(u, *discriminator, id)? {
                value.as_deref()
            } else {
                None
            }
        }
        (TypeKind::Array(_) | TypeKind::Sequence(_), Storage::Primitives(values)) => {
            let index = position(desc, id, values.len(), true)?;
            return values
                .get(index)
                .map(Slot::Element)
                .ok_or(DynamicDataError::IndexOutOfRange {
                    index,
                    bound: values.len(),
                });
        }
        (TypeKind::Array(_) | TypeKind::Sequence(_), Storage::Complex(items)) => {
            Some(&items[position(desc, id, items.len(), true)?])
        }
        (_, node) => return Err(shape_error(desc, node)),
    };
    match found {
        Some(Storage::Loaned) => Err(DynamicDataError::LoanOutstanding(member::member_name(
            desc, id,
        ))),
        Some(node) => Ok(Slot::Node(node)),
        None => Ok(Slot::Absent),
    }
}

/// Locate member `id` of `node` for writing.
pub(crate) fn slot_mut<'s>(
    desc: &TypeDescriptor,
    node: &'s mut Storage,
    id: MemberId,
) -> Result<SlotMut<'s>> {
    match (&desc.resolved().kind, node) {
        (TypeKind::Struct(_), Storage::Struct(slots)) => {
            let index = position(desc, id, slots.len(), false)?;
            let slot = &mut slots[index];
            if slot.is_none() {
                return Ok(SlotMut::Vacant(Vacant::Optional(slot)));
            }
            match slot.as_mut() {
                Some(child) => checked_node(desc, id, child),
                None => Err(DynamicDataError::UnknownMember(member::member_name(desc, id))),
            }
        }
        (TypeKind::Union(u), Storage::Union {
            discriminator,
            value,
        }) => {
            if active_case(u, *discriminator, id)? && value.is_some() {
                return match value.as_deref_mut() {
                    Some(child) => checked_node(desc, id, child),
                    None => Err(DynamicDataError::UnknownMember(member::member_name(desc, id))),
                };
            }
            if value.as_deref().is_some_and(Storage::contains_loan) {
                return Err(DynamicDataError::LoanOutstanding(desc.name.clone()));
            }
            Ok(SlotMut::Vacant(Vacant::Case {
                discriminator,
                value,
                label: id.0,
            }))
        }
        (TypeKind::Array(_) | TypeKind::Sequence(_), Storage::Primitives(values)) => {
            let index = position(desc, id, values.len(), true)?;
            Ok(SlotMut::Element { values, index })
        }
        (TypeKind::Array(_) | TypeKind::Sequence(_), Storage::Complex(items)) => {
            let index = position(desc, id, items.len(), true)?;
            checked_node(desc, id, &mut items[index])
        }
        (_, node) => Err(shape_error(desc, node)),
    }
}

/// True if member `id` is present in `node`.
pub(crate) fn exists(desc: &TypeDescriptor, node: &Storage, id: MemberId) -> bool {
    match slot(desc, node, id) {
        Ok(Slot::Node(_) | Slot::Element(_)) | Err(DynamicDataError::LoanOutstanding(_)) => true,
        Ok(Slot::Absent) | Err(_) => false,
    }
}

fn checked_node<'s>(
    desc: &TypeDescriptor,
    id: MemberId,
    node: &'s mut Storage,
) -> Result<SlotMut<'s>> {
    if matches!(node, Storage::Loaned) {
        Err(DynamicDataError::LoanOutstanding(member::member_name(desc, id)))
    } else {
        Ok(SlotMut::Node(node))
    }
}

/// True if label `id` selects the same case as the current discriminator.
fn active_case(u: &UnionDescriptor, discriminator: i64, id: MemberId) -> Result<bool> {
    let case = u
        .case_by_discriminator(id.0)
        .ok_or_else(|| DynamicDataError::UnknownMember(format!("union label {}", id)))?;
    Ok(u
        .case_by_discriminator(discriminator)
        .is_some_and(|active| ptr::eq(active, case)))
}

/// Zero-based position of a 1-based id.
fn position(desc: &TypeDescriptor, id: MemberId, len: usize, collection: bool) -> Result<usize> {
    let index = usize::try_from(id.0)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(|| DynamicDataError::UnknownMember(member::member_name(desc, id)))?;
    if index < len {
        Ok(index)
    } else if collection {
        Err(DynamicDataError::IndexOutOfRange { index, bound: len })
    } else {
        Err(DynamicDataError::UnknownMember(member::member_name(desc, id)))
    }
}

fn shape_error(desc: &TypeDescriptor, node: &Storage) -> DynamicDataError {
    match node {
        Storage::Loaned => DynamicDataError::LoanOutstanding(desc.name.clone()),
        Storage::Scalar(s) => {
            DynamicDataError::type_mismatch("struct, union or collection", s.kind_name())
        }
        _ => DynamicDataError::type_mismatch(desc.member_kind().name(), "mismatched storage"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumBuilder, TypeDescriptorBuilder, UnionBuilder};
    use std::sync::Arc;

    fn prop() -> DataProperty {
        DataProperty::default()
    }

    #[test]
    fn test_default_struct_storage() {
        let desc = TypeDescriptorBuilder::new("S")
            .field("a", PrimitiveKind::I32)
            .optional_field("b", PrimitiveKind::F64)
            .sequence_field("c", PrimitiveKind::U8)
            .array_field("d", PrimitiveKind::U16, 3)
            .build();
        let storage = Storage::new(&desc, &prop());
        match &storage {
            Storage::Struct(slots) => {
                assert_eq!(slots[0], Some(Storage::Scalar(Scalar::I32(0))));
                assert_eq!(slots[1], None);
                assert_eq!(slots[2].as_ref().and_then(Storage::len), Some(0));
                assert_eq!(slots[3].as_ref().and_then(Storage::len), Some(3));
            }
            other => panic!("unexpected storage {:?}", other),
        }
        assert_eq!(storage.member_count(), 3);
    }

    #[test]
    fn test_default_enum_and_union() {
        let color = Arc::new(
            EnumBuilder::new("Color")
                .variant_value("RED", 5)
                .variant("GREEN")
                .build(),
        );
        assert_eq!(default_scalar(&color), Some(Scalar::Enum(5)));

        let union = UnionBuilder::with_i32_discriminator("U")
            .primitive_case("a", 3, PrimitiveKind::I16)
            .case("c", 4, color)
            .build();
        match Storage::new(&union, &prop()) {
            Storage::Union {
                discriminator,
                value,
            } => {
                assert_eq!(discriminator, 3);
                assert_eq!(value.as_deref(), Some(&Storage::Scalar(Scalar::I16(0))));
            }
            other => panic!("unexpected storage {:?}", other),
        }
    }

    #[test]
    fn test_primitive_vec_ops() {
        let mut values = PrimitiveVec::filled(&Scalar::I32(0), 2);
        values.set(1, Scalar::I32(7)).expect("set");
        assert_eq!(values.get(1), Some(Scalar::I32(7)));
        assert!(values.set(1, Scalar::U8(1)).is_err());
        assert_eq!(
            values.set(2, Scalar::I32(1)),
            Err(DynamicDataError::IndexOutOfRange { index: 2, bound: 2 })
        );
        values.push(Scalar::I32(9)).expect("push");
        values.resize(5, &Scalar::I32(-1)).expect("resize");
        let all: Vec<Scalar> = values.iter().collect();
        assert_eq!(all.len(), 5);
        assert_eq!(all[4], Scalar::I32(-1));
    }

    #[test]
    fn test_slot_and_vacant_install() {
        let desc = TypeDescriptorBuilder::new("S")
            .optional_field("b", PrimitiveKind::F64)
            .build();
        let mut storage = Storage::new(&desc, &prop());
        assert!(matches!(slot(&desc, &storage, MemberId(1)), Ok(Slot::Absent)));
        assert!(!exists(&desc, &storage, MemberId(1)));

        match slot_mut(&desc, &mut storage, MemberId(1)).expect("slot") {
            SlotMut::Vacant(v) => {
                v.install(Storage::Scalar(Scalar::F64(1.5)));
            }
            _ => panic!("expected vacant slot"),
        }
        assert!(exists(&desc, &storage, MemberId(1)));
        assert!(matches!(
            slot(&desc, &storage, MemberId(2)),
            Err(DynamicDataError::UnknownMember(_))
        ));
    }

    #[test]
    fn test_loaned_slot_rejected() {
        let inner = Arc::new(TypeDescriptorBuilder::new("In").build());
        let desc = TypeDescriptorBuilder::new("S")
            .field_with_type("inner", inner)
            .build();
        let mut storage = Storage::new(&desc, &prop());
        if let Storage::Struct(slots) = &mut storage {
            slots[0] = Some(Storage::Loaned);
        }
        assert!(storage.contains_loan());
        assert!(matches!(
            slot(&desc, &storage, MemberId(1)),
            Err(DynamicDataError::LoanOutstanding(ref n)) if n == "inner"
        ));
        assert!(storage.clear_all(&desc, &prop()).is_err());
        assert!(storage.clear_member(&desc, MemberId(1), &prop()).is_err());
    }
}
